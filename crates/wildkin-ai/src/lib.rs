//! # Wildkin AI
//!
//! Creature behavior core for Project Wildkin.
//!
//! This crate provides the decision making and lifecycle of wild creatures:
//! - Agent state machine (idle, wander, alert, chase, flee, attack)
//! - Perception zones with enter/exit edge events
//! - Navigation provider seam for external pathfinding
//! - Combat and loot resolution against tracked targets
//! - Gravity integration for the vertical axis
//! - Species presets and world-start population spawning
//! - Event bus for presentation-layer consumers
//!
//! The world is single-threaded and fixed-tick: call [`world::World::step`]
//! once per simulation step and drain events when convenient.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod brain;
pub mod combat;
pub mod events;
pub mod loot;
pub mod movement;
pub mod navigation;
pub mod perception;
pub mod spawner;
pub mod species;
pub mod terrain;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::brain::{BrainCommand, TickCtx};
    pub use crate::combat::*;
    pub use crate::events::*;
    pub use crate::loot::*;
    pub use crate::movement::*;
    pub use crate::navigation::*;
    pub use crate::perception::*;
    pub use crate::spawner::*;
    pub use crate::species::*;
    pub use crate::terrain::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_full_hunt_ends_in_loot() {
        let mut world = World::new(3);
        let wolf = world.spawn_agent(Species::Wolf.preset(), Vec3::ZERO);
        let player = world.register_target(Box::new(SimpleTarget::new(
            Vec3::new(6.0, 0.0, 0.0),
            100.0,
        )));

        // Let the wolf notice, chase and start biting.
        for _ in 0..(5.0 / DT) as usize {
            world.step(DT);
        }
        assert_eq!(world.agent(wolf).map(Agent::state), Some(AgentState::Attack));

        // The player fights back and wins.
        world
            .damage_agent(wolf, 1_000.0, Some(player))
            .expect("wolf exists");

        let events = world.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, AgentEvent::Died { .. })));
        assert!(events
            .iter()
            .any(|event| matches!(event, AgentEvent::LootDropped { .. })));
    }

    /// Every edge the state machine can legally take. Chase is reachable
    /// from anywhere because a provoked Neutral agent turns to chase on the
    /// spot.
    fn allowed_transition(from: AgentState, to: AgentState) -> bool {
        use AgentState::{Alert, Attack, Chase, Flee, Idle, Wander};
        matches!(
            (from, to),
            (Idle, Wander)
                | (Idle, Alert)
                | (Wander, Idle)
                | (Wander, Alert)
                | (Alert, Idle)
                | (Alert, Flee)
                | (Chase, Idle)
                | (Chase, Attack)
                | (Attack, Chase)
                | (Attack, Idle)
                | (Flee, Idle)
                | (_, Chase)
        )
    }

    #[test]
    fn test_observed_transitions_follow_the_table() {
        let mut world = World::new(7);
        let mut creatures = Vec::new();
        for (i, species) in Species::all().into_iter().enumerate() {
            let position = Vec3::new(6.0 + i as f32 * 3.0, 0.0, 0.0);
            creatures.push(world.spawn_agent(species.preset(), position));
        }
        let player = world.register_target(Box::new(SimpleTarget::new(Vec3::ZERO, 100.0)));
        world.drain_events();

        let ticks = (20.0 / DT) as usize;
        for tick in 0..ticks {
            // The player circles the herd; two light pokes along the way
            // provoke whoever is still alive.
            let t = tick as f32 * DT;
            let orbit = Vec3::new(10.0 * t.sin(), 0.5, 10.0 * t.cos());
            world
                .set_target_position(player, orbit)
                .expect("player registered");
            if tick == ticks / 3 || tick == 2 * ticks / 3 {
                for &id in &creatures {
                    let _ = world.damage_agent(id, 3.0, Some(player));
                }
            }
            world.step(DT);

            for event in world.drain_events() {
                if let AgentEvent::StateChanged { from, to, .. } = event {
                    assert!(
                        allowed_transition(from, to),
                        "illegal transition {from:?} -> {to:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_spawned_population_behaves() {
        let mut world = World::new(9);
        let mut spawner = PopulationSpawner::island_default(9);
        let spawned = spawner.spawn(&mut world, &FlatTerrain::new(0.0));
        assert!(!spawned.is_empty());

        // A quiet world: everyone idles or wanders, nobody fights.
        for _ in 0..(5.0 / DT) as usize {
            world.step(DT);
        }
        for agent in world.agents() {
            assert!(matches!(
                agent.state(),
                AgentState::Idle | AgentState::Wander
            ));
        }
    }
}
