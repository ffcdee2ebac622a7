//! Headless sandbox: spawn the island population, walk a player through it,
//! and print what the creatures do.
//!
//! Run with `RUST_LOG=debug` for per-agent detail.

#![warn(missing_docs)]
#![warn(clippy::all)]

use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wildkin_ai::prelude::*;

/// Fixed simulation step, 60 Hz.
const DT: f32 = 1.0 / 60.0;
/// Simulated seconds to run.
const DURATION: f32 = 45.0;
/// Player walk speed, units per second.
const PLAYER_SPEED: f32 = 3.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut world = World::new(2024);
    let mut spawner = PopulationSpawner::island_default(2024);
    let spawned = spawner.spawn(&mut world, &FlatTerrain::new(0.0));
    info!(creatures = spawned.len(), "island populated");

    let player = world.register_target(Box::new(SimpleTarget::new(
        Vec3::new(0.0, 0.5, 0.0),
        100.0,
    )));

    let mut looted = 0u32;
    let ticks = (DURATION / DT) as usize;
    for tick in 0..ticks {
        // Scripted player: walk a straight line out from the camp, through
        // the herds and into wolf territory.
        let t = tick as f32 * DT;
        let position = Vec3::new(t * PLAYER_SPEED, 0.5, 0.0);
        if world.set_target_position(player, position).is_err() {
            break;
        }

        world.step(DT);

        for event in world.drain_events() {
            report(&event, &mut looted);
        }
    }

    let player_alive = world.target(player).is_some_and(|target| target.is_alive());
    info!(
        creatures_left = world.len(),
        items_looted = looted,
        player_alive,
        "sandbox finished"
    );
}

fn report(event: &AgentEvent, looted: &mut u32) {
    match event {
        AgentEvent::Spawned { entity_id } => {
            info!(agent = entity_id.raw(), "spawned");
        }
        AgentEvent::StateChanged { entity_id, from, to } => {
            info!(agent = entity_id.raw(), ?from, ?to, "state changed");
        }
        AgentEvent::Damaged {
            entity_id, amount, ..
        } => {
            info!(agent = entity_id.raw(), amount, "damaged");
        }
        AgentEvent::Provoked { entity_id } => {
            info!(agent = entity_id.raw(), "provoked");
        }
        AgentEvent::AttackLanded {
            attacker, damage, ..
        } => {
            info!(agent = attacker.raw(), damage, "attack landed on player");
        }
        AgentEvent::Died { entity_id } => {
            info!(agent = entity_id.raw(), "died");
        }
        AgentEvent::LootDropped { item, amount, .. } => {
            *looted += amount;
            info!(item = item.raw(), amount, "loot received");
        }
        AgentEvent::Despawned { entity_id } => {
            info!(agent = entity_id.raw(), "despawned");
        }
    }
}
