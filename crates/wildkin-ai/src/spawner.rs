//! Population spawner.
//!
//! Scatter-places creatures across the map at world start: per-species
//! counts, a minimum clearance around the spawn center, minimum spacing
//! between creatures, and per-species overrides (predators pushed farther
//! out, small game packed tighter). Placement is rejection-sampled with a
//! bounded attempt count, so a crowded or unwalkable map degrades to
//! fewer creatures instead of an endless loop.

use glam::Vec3;
use tracing::{debug, info, warn};
use wildkin_common::{horizontal_distance, EntityId};

use crate::species::Species;
use crate::terrain::TerrainSampler;
use crate::world::World;

/// Height offset so creatures spawn standing on, not in, the ground.
const SPAWN_HEIGHT_OFFSET: f32 = 0.5;

/// How many creatures of one species to place, and where they may go.
#[derive(Debug, Clone)]
pub struct SpawnPlan {
    /// Species to spawn.
    pub species: Species,
    /// How many to place.
    pub count: u32,
    /// Overrides the spawner-wide spacing for this species.
    pub min_spacing: Option<f32>,
    /// Overrides the spawner-wide center clearance for this species.
    pub min_from_center: Option<f32>,
}

impl SpawnPlan {
    /// Creates a plan using the spawner-wide placement rules.
    #[must_use]
    pub const fn new(species: Species, count: u32) -> Self {
        Self {
            species,
            count,
            min_spacing: None,
            min_from_center: None,
        }
    }

    /// Sets a species-specific spacing between creatures.
    #[must_use]
    pub const fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = Some(spacing);
        self
    }

    /// Sets a species-specific clearance from the spawn center.
    #[must_use]
    pub const fn with_min_from_center(mut self, distance: f32) -> Self {
        self.min_from_center = Some(distance);
        self
    }
}

/// Placement rules shared by every plan.
#[derive(Debug, Clone)]
pub struct SpawnerConfig {
    /// Creatures are placed within this radius of the origin.
    pub spawn_radius: f32,
    /// No creature spawns closer to the origin than this.
    pub min_from_center: f32,
    /// Minimum distance between any two placed creatures.
    pub min_spacing: f32,
    /// Placement attempts allowed per requested creature.
    pub attempts_per_spawn: u32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_radius: 150.0,
            min_from_center: 30.0,
            min_spacing: 15.0,
            attempts_per_spawn: 20,
        }
    }
}

/// Places the starting creature population into a world.
#[derive(Debug)]
pub struct PopulationSpawner {
    config: SpawnerConfig,
    plans: Vec<SpawnPlan>,
    rng: fastrand::Rng,
}

impl PopulationSpawner {
    /// Creates a spawner with no plans.
    #[must_use]
    pub fn new(config: SpawnerConfig, seed: u64) -> Self {
        Self {
            config,
            plans: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Creates a spawner with the default island population: a deer herd,
    /// a wolf pack kept away from the shore camp, plenty of rabbits and a
    /// few elephants that need room.
    #[must_use]
    pub fn island_default(seed: u64) -> Self {
        let mut spawner = Self::new(SpawnerConfig::default(), seed);
        spawner.add_plan(SpawnPlan::new(Species::Deer, 8));
        spawner.add_plan(SpawnPlan::new(Species::Wolf, 3).with_min_from_center(60.0));
        spawner.add_plan(SpawnPlan::new(Species::Rabbit, 12).with_min_spacing(8.0));
        spawner.add_plan(
            SpawnPlan::new(Species::Elephant, 4)
                .with_min_spacing(25.0)
                .with_min_from_center(50.0),
        );
        spawner
    }

    /// Adds a spawn plan.
    pub fn add_plan(&mut self, plan: SpawnPlan) {
        self.plans.push(plan);
    }

    /// The configured plans.
    #[must_use]
    pub fn plans(&self) -> &[SpawnPlan] {
        &self.plans
    }

    /// Places every plan's creatures into the world.
    ///
    /// Returns the spawned agent IDs. Plans that run out of placement
    /// attempts spawn fewer creatures than requested and log a warning.
    pub fn spawn(&mut self, world: &mut World, terrain: &dyn TerrainSampler) -> Vec<EntityId> {
        let mut placed: Vec<Vec3> = Vec::new();
        let mut spawned = Vec::new();
        let radius = self.config.spawn_radius;

        for plan in &self.plans {
            let spacing = plan.min_spacing.unwrap_or(self.config.min_spacing);
            let clearance = plan.min_from_center.unwrap_or(self.config.min_from_center);
            let max_attempts = plan.count * self.config.attempts_per_spawn;

            let mut count = 0;
            let mut attempts = 0;
            while count < plan.count && attempts < max_attempts {
                attempts += 1;

                let x = self.rng.f32() * 2.0 * radius - radius;
                let z = self.rng.f32() * 2.0 * radius - radius;

                if (x * x + z * z).sqrt() < clearance {
                    continue;
                }
                if !terrain.is_walkable(x, z) {
                    continue;
                }

                let position = Vec3::new(x, terrain.height(x, z) + SPAWN_HEIGHT_OFFSET, z);
                if placed
                    .iter()
                    .any(|other| horizontal_distance(*other, position) < spacing)
                {
                    continue;
                }

                let id = world.spawn_agent(plan.species.preset(), position);
                if let Some(agent) = world.agent_mut(id) {
                    agent.set_facing(self.rng.f32() * std::f32::consts::TAU);
                }

                placed.push(position);
                spawned.push(id);
                count += 1;
            }

            if count < plan.count {
                warn!(
                    species = plan.species.display_name(),
                    requested = plan.count,
                    placed = count,
                    "ran out of placement attempts"
                );
            } else {
                debug!(
                    species = plan.species.display_name(),
                    count, "species placed"
                );
            }
        }

        info!(total = spawned.len(), "population spawned");
        spawned
    }
}
