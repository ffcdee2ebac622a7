//! Perception zone: a fixed-radius volume that reports trackable entities
//! crossing its boundary.
//!
//! The zone is scanned once per tick; crossings surface as edge events that
//! the world feeds into the owning agent at the next update boundary. Only
//! presence matters, so events are neither queued across ticks nor coalesced.

use ahash::AHashSet;
use glam::Vec3;
use wildkin_common::{horizontal_distance, EntityId};

/// Boundary-crossing event produced by a perception zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerceptionEvent {
    /// A trackable entity entered detection range.
    Entered(EntityId),
    /// A previously detected entity left detection range.
    Exited(EntityId),
}

/// Fixed-radius detection volume centered on an agent.
#[derive(Debug, Clone)]
pub struct PerceptionZone {
    radius: f32,
    inside: AHashSet<EntityId>,
}

impl PerceptionZone {
    /// Creates a zone with the given detection radius.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            inside: AHashSet::new(),
        }
    }

    /// The detection radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether the entity was inside the zone at the last scan.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.inside.contains(&entity)
    }

    /// Compares current candidate positions against the last scan and pushes
    /// one event per boundary crossing.
    ///
    /// Distance is measured on the ground plane. Candidates no longer offered
    /// (despawned entities) count as exited. Event order follows candidate
    /// order for entries; exits are sorted by entity ID so a scan is
    /// deterministic regardless of hash state.
    pub fn scan<I>(&mut self, center: Vec3, candidates: I, out: &mut Vec<PerceptionEvent>)
    where
        I: IntoIterator<Item = (EntityId, Vec3)>,
    {
        let mut current = AHashSet::new();
        for (entity, position) in candidates {
            if horizontal_distance(center, position) <= self.radius {
                current.insert(entity);
                if !self.inside.contains(&entity) {
                    out.push(PerceptionEvent::Entered(entity));
                }
            }
        }

        let mut exited: Vec<EntityId> = self
            .inside
            .iter()
            .filter(|entity| !current.contains(*entity))
            .copied()
            .collect();
        exited.sort_by_key(|entity| entity.raw());
        out.extend(exited.into_iter().map(PerceptionEvent::Exited));

        self.inside = current;
    }
}
