//! Combat resolution.
//!
//! A single melee path: the attack handler decides *when* (cooldown, range),
//! this resolver decides *what happens*: fixed damage applied to the
//! target's stat holder, fire-and-forget. Delivery failure is not an error;
//! a stale target simply means nothing happens.

use tracing::debug;
use wildkin_common::EntityId;

use crate::world::StatHolder;

/// What an attack resolution did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// Damage was applied to the target.
    Delivered {
        /// Amount applied.
        damage: f32,
    },
    /// The target reference no longer resolves; nothing happened.
    StaleTarget,
}

/// Applies attack damage to tracked targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies `damage` from `attacker` to the target's stat holder.
    ///
    /// No retry, no failure surfaced: a missing target is a silent no-op.
    pub fn attack<S: StatHolder + ?Sized>(
        &self,
        attacker: EntityId,
        damage: f32,
        target: Option<&mut S>,
    ) -> AttackOutcome {
        let Some(target) = target else {
            return AttackOutcome::StaleTarget;
        };

        target.take_damage(damage);
        debug!(attacker = attacker.raw(), damage, "attack landed");
        AttackOutcome::Delivered { damage }
    }
}
