//! World registry and fixed-tick driver.
//!
//! Owns the live agents and the trackable entities they interact with.
//! Agents never hold references to their targets; they hold an [`EntityId`]
//! that is resolved through this registry on every use, so removing an
//! entity invalidates every weak reference to it at once.
//!
//! The tick model is single-threaded and cooperative: [`World::step`] runs
//! each agent exactly once per call, synchronously - perception scan, state
//! handler, movement integration, combat resolution - with no suspension
//! and no reentrancy.

use ahash::AHashMap;
use glam::Vec3;
use thiserror::Error;
use tracing::{debug, info};
use wildkin_common::{EntityId, ItemTypeId};

use crate::agent::{Agent, AgentConfig, DamageOutcome};
use crate::brain::{self, BrainCommand, TickCtx};
use crate::combat::{AttackOutcome, CombatResolver};
use crate::events::{AgentEvent, EventBus};
use crate::loot::LootResolver;
use crate::navigation::{DirectPath, NavigationProvider};
use crate::perception::{PerceptionEvent, PerceptionZone};
use crate::terrain::{FlatTerrain, TerrainSampler};

/// Seconds a corpse lingers before removal, long enough for the
/// presentation layer to play a death effect.
pub const CORPSE_REMOVAL_DELAY: f32 = 0.5;

/// World error types.
#[derive(Debug, Clone, Error)]
pub enum WorldError {
    /// Agent not found
    #[error("agent not found: {0:?}")]
    AgentNotFound(EntityId),
    /// Target entity not found
    #[error("target not found: {0:?}")]
    TargetNotFound(EntityId),
    /// Entity already registered
    #[error("entity already registered: {0:?}")]
    AlreadyRegistered(EntityId),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Capability: an entity whose health can be reduced.
pub trait StatHolder {
    /// Applies damage to the entity.
    fn take_damage(&mut self, amount: f32);

    /// Whether the entity is still alive.
    fn is_alive(&self) -> bool;
}

/// Capability: an entity that can receive items.
pub trait InventoryHolder {
    /// Offers items; returns whether the full amount was accepted.
    fn add_item(&mut self, item: ItemTypeId, amount: u32) -> bool;
}

/// A trackable entity: something agents can perceive, chase, damage and
/// deliver loot to. Implemented by the player and any other huntable actor.
pub trait Trackable: StatHolder + InventoryHolder {
    /// Current world position.
    fn position(&self) -> Vec3;

    /// Moves the entity (driven by the player/actor systems, not by agents).
    fn set_position(&mut self, position: Vec3);
}

/// Minimal trackable entity: a position, clamped health and a slot-limited
/// item bag. Serves as the sandbox player and as a test double.
#[derive(Debug, Clone)]
pub struct SimpleTarget {
    position: Vec3,
    health: f32,
    max_health: f32,
    items: AHashMap<ItemTypeId, u32>,
    slot_capacity: Option<usize>,
}

impl SimpleTarget {
    /// Creates a target at the given position with full health.
    #[must_use]
    pub fn new(position: Vec3, max_health: f32) -> Self {
        Self {
            position,
            health: max_health,
            max_health,
            items: AHashMap::new(),
            slot_capacity: None,
        }
    }

    /// Limits the inventory to a number of distinct item slots; offers for
    /// new items beyond the limit are refused.
    #[must_use]
    pub fn with_slot_capacity(mut self, slots: usize) -> Self {
        self.slot_capacity = Some(slots);
        self
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Held quantity of an item.
    #[must_use]
    pub fn item_count(&self, item: ItemTypeId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }
}

impl StatHolder for SimpleTarget {
    fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

impl InventoryHolder for SimpleTarget {
    fn add_item(&mut self, item: ItemTypeId, amount: u32) -> bool {
        let current = self.items.get(&item).copied().unwrap_or(0);
        if current == 0 {
            if let Some(capacity) = self.slot_capacity {
                if self.items.len() >= capacity {
                    return false;
                }
            }
        }
        self.items.insert(item, current + amount);
        true
    }
}

impl Trackable for SimpleTarget {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

/// The creature world: agents, their collaborators, and the tick driver.
pub struct World {
    agents: AHashMap<EntityId, Agent>,
    zones: AHashMap<EntityId, PerceptionZone>,
    nav: AHashMap<EntityId, Box<dyn NavigationProvider>>,
    targets: AHashMap<EntityId, Box<dyn Trackable>>,
    corpse_timers: AHashMap<EntityId, f32>,
    terrain: Box<dyn TerrainSampler>,
    events: EventBus,
    combat: CombatResolver,
    loot: LootResolver,
    rng: fastrand::Rng,
}

impl Default for World {
    fn default() -> Self {
        Self::new(0)
    }
}

impl World {
    /// Creates an empty world with a seeded RNG (idle dwell, wander points
    /// and loot rolls all draw from it, so equal seeds replay equally).
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            agents: AHashMap::new(),
            zones: AHashMap::new(),
            nav: AHashMap::new(),
            targets: AHashMap::new(),
            corpse_timers: AHashMap::new(),
            terrain: Box::new(FlatTerrain::new(0.0)),
            events: EventBus::default(),
            combat: CombatResolver::new(),
            loot: LootResolver::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Replaces the terrain sampler.
    pub fn set_terrain(&mut self, terrain: Box<dyn TerrainSampler>) {
        self.terrain = terrain;
    }

    /// The event bus agents publish to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Drains all pending events.
    pub fn drain_events(&self) -> Vec<AgentEvent> {
        self.events.drain()
    }

    /// Returns the number of agents, dead-but-not-removed included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns whether the world has no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Spawns an agent and wires up its perception zone and a straight-line
    /// navigation provider. Returns the new agent's ID.
    pub fn spawn_agent(&mut self, config: AgentConfig, position: Vec3) -> EntityId {
        let id = EntityId::new();
        let zone = PerceptionZone::new(config.detection_range);

        debug!(agent = id.raw(), ?position, "agent spawned");
        self.agents.insert(id, Agent::new(id, config, position));
        self.zones.insert(id, zone);
        self.nav.insert(id, Box::new(DirectPath::new()));
        self.events.publish(AgentEvent::Spawned { entity_id: id });
        id
    }

    /// Gets an agent's state.
    #[must_use]
    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Gets mutable agent state.
    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Iterates over all agents.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Replaces an agent's navigation provider.
    pub fn attach_navigation(
        &mut self,
        id: EntityId,
        provider: Box<dyn NavigationProvider>,
    ) -> WorldResult<()> {
        if !self.agents.contains_key(&id) {
            return Err(WorldError::AgentNotFound(id));
        }
        self.nav.insert(id, provider);
        Ok(())
    }

    /// Removes an agent's navigation provider; the agent keeps evaluating
    /// transitions but holds position in the moving states.
    pub fn detach_navigation(&mut self, id: EntityId) -> Option<Box<dyn NavigationProvider>> {
        self.nav.remove(&id)
    }

    /// Registers a trackable entity and returns its ID.
    pub fn register_target(&mut self, target: Box<dyn Trackable>) -> EntityId {
        let id = EntityId::new();
        self.targets.insert(id, target);
        id
    }

    /// Registers a trackable entity under an existing ID.
    pub fn register_target_as(
        &mut self,
        id: EntityId,
        target: Box<dyn Trackable>,
    ) -> WorldResult<()> {
        if self.targets.contains_key(&id) {
            return Err(WorldError::AlreadyRegistered(id));
        }
        self.targets.insert(id, target);
        Ok(())
    }

    /// Removes a trackable entity. Agents holding its ID see their target
    /// reference go stale on their next update.
    pub fn remove_target(&mut self, id: EntityId) -> WorldResult<Box<dyn Trackable>> {
        self.targets.remove(&id).ok_or(WorldError::TargetNotFound(id))
    }

    /// Gets a trackable entity.
    #[must_use]
    pub fn target(&self, id: EntityId) -> Option<&dyn Trackable> {
        self.targets.get(&id).map(|target| &**target)
    }

    /// Gets a trackable entity mutably.
    pub fn target_mut(&mut self, id: EntityId) -> Option<&mut (dyn Trackable + 'static)> {
        self.targets.get_mut(&id).map(|target| &mut **target)
    }

    /// Moves a trackable entity.
    pub fn set_target_position(&mut self, id: EntityId, position: Vec3) -> WorldResult<()> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(WorldError::TargetNotFound(id))?;
        target.set_position(position);
        Ok(())
    }

    /// Applies external damage to an agent (a player strike, a trap).
    ///
    /// Publishes the resulting events and, on a killing blow, resolves loot
    /// against the recorded attacker and schedules corpse removal. Calling
    /// this on an already dead agent is a no-op.
    pub fn damage_agent(
        &mut self,
        id: EntityId,
        amount: f32,
        attacker: Option<EntityId>,
    ) -> WorldResult<DamageOutcome> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(WorldError::AgentNotFound(id))?;

        let prev_state = agent.state();
        let outcome = agent.take_damage(amount, attacker);
        if outcome == DamageOutcome::AlreadyDead {
            return Ok(outcome);
        }

        let new_state = agent.state();
        let killer = agent.target();
        let drop_table = agent.config().drop;

        self.events.publish(AgentEvent::Damaged {
            entity_id: id,
            amount,
            source: attacker,
        });

        if outcome == DamageOutcome::Escalated {
            debug!(agent = id.raw(), "neutral agent provoked, now aggressive");
            self.events.publish(AgentEvent::Provoked { entity_id: id });
        }

        if new_state != prev_state {
            self.events.publish(AgentEvent::StateChanged {
                entity_id: id,
                from: prev_state,
                to: new_state,
            });
        }

        if outcome == DamageOutcome::Died {
            let mut delivered = None;
            if let Some(killer_id) = killer {
                if let Some(target) = self.targets.get_mut(&killer_id) {
                    delivered = self
                        .loot
                        .resolve_death(&mut self.rng, drop_table.as_ref(), Some(&mut **target))
                        .map(|(item, amount)| (killer_id, item, amount));
                }
            }

            info!(agent = id.raw(), "agent died");
            self.events.publish(AgentEvent::Died { entity_id: id });
            if let Some((recipient, item, amount)) = delivered {
                self.events.publish(AgentEvent::LootDropped {
                    source: id,
                    recipient,
                    item,
                    amount,
                });
            }
            self.corpse_timers.insert(id, CORPSE_REMOVAL_DELAY);
        }

        Ok(outcome)
    }

    /// Advances the whole world by one fixed tick.
    ///
    /// Per agent: scan the perception zone and deliver edge events, run the
    /// state handler, integrate movement against the terrain, and resolve
    /// any requested attack. Agents update in ID order so a seeded world
    /// replays identically.
    pub fn step(&mut self, dt: f32) {
        self.remove_expired_corpses(dt);

        let mut candidates: Vec<(EntityId, Vec3)> = self
            .targets
            .iter()
            .filter(|(_, target)| target.is_alive())
            .map(|(&id, target)| (id, target.position()))
            .collect();
        candidates.sort_by_key(|(id, _)| id.raw());

        let mut agent_ids: Vec<EntityId> = self.agents.keys().copied().collect();
        agent_ids.sort_by_key(|id| id.raw());

        let mut perception_events = Vec::new();
        for id in agent_ids {
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            if !agent.is_alive() {
                continue;
            }

            let prev_state = agent.state();

            // Edge events from the detection volume land on the agent before
            // its handler runs this tick.
            perception_events.clear();
            if let Some(zone) = self.zones.get_mut(&id) {
                zone.scan(agent.position(), candidates.iter().copied(), &mut perception_events);
            }
            for event in &perception_events {
                match *event {
                    PerceptionEvent::Entered(entity) => agent.on_target_entered(entity),
                    PerceptionEvent::Exited(entity) => agent.on_target_exited(entity),
                }
            }

            // Weak reference resolution: removed or dead entities read as absent.
            let target_position = agent.target().and_then(|target_id| {
                self.targets
                    .get(&target_id)
                    .filter(|target| target.is_alive())
                    .map(|target| target.position())
            });

            let command = {
                let mut ctx = TickCtx {
                    nav: self
                        .nav
                        .get_mut(&id)
                        .map(|nav| &mut **nav as &mut dyn NavigationProvider),
                    target_position,
                    rng: &mut self.rng,
                };
                brain::update(agent, dt, &mut ctx)
            };

            // Horizontal intent from the state machine, vertical from gravity.
            let position = agent.position();
            let velocity = agent.desired_velocity();
            let ahead = position + velocity * dt;
            let ground = self.terrain.height(ahead.x, ahead.z);
            let next = agent.gravity_mut().integrate(position, velocity, dt, ground);
            agent.set_position(next);

            if command == Some(BrainCommand::Attack) {
                let damage = agent.config().attack_damage;
                if let Some(target_id) = agent.target() {
                    let target = self.targets.get_mut(&target_id).map(|target| &mut **target);
                    if let AttackOutcome::Delivered { damage } =
                        self.combat.attack(id, damage, target)
                    {
                        self.events.publish(AgentEvent::AttackLanded {
                            attacker: id,
                            target: target_id,
                            damage,
                        });
                    }
                }
            }

            let new_state = agent.state();
            if new_state != prev_state {
                self.events.publish(AgentEvent::StateChanged {
                    entity_id: id,
                    from: prev_state,
                    to: new_state,
                });
            }
        }
    }

    fn remove_expired_corpses(&mut self, dt: f32) {
        if self.corpse_timers.is_empty() {
            return;
        }

        let mut expired = Vec::new();
        for (id, timer) in self.corpse_timers.iter_mut() {
            *timer -= dt;
            if *timer <= 0.0 {
                expired.push(*id);
            }
        }
        expired.sort_by_key(|id| id.raw());

        for id in expired {
            self.corpse_timers.remove(&id);
            self.agents.remove(&id);
            self.zones.remove(&id);
            self.nav.remove(&id);
            debug!(agent = id.raw(), "corpse removed");
            self.events.publish(AgentEvent::Despawned { entity_id: id });
        }
    }
}
