//! Vertical movement integration.
//!
//! The state machine only ever emits a horizontal velocity; falling and
//! landing are handled here, outside the behavior logic. Slide-collision
//! response stays with the external physics layer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default downward acceleration, in units per second squared.
pub const DEFAULT_GRAVITY: f32 = 9.8;

/// Vertical motion state for one creature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GravityBody {
    /// Current vertical velocity (negative = falling).
    pub velocity_y: f32,
    /// Whether the body rests on the ground.
    pub grounded: bool,
    /// Downward acceleration applied while airborne.
    pub gravity: f32,
}

impl Default for GravityBody {
    fn default() -> Self {
        Self {
            velocity_y: 0.0,
            grounded: false,
            gravity: DEFAULT_GRAVITY,
        }
    }
}

impl GravityBody {
    /// Advances one tick: applies gravity, combines the horizontal velocity
    /// into a displacement, and snaps to the ground on landing.
    ///
    /// `ground_height` is the terrain height under the new horizontal
    /// position. Returns the new position.
    pub fn integrate(
        &mut self,
        position: Vec3,
        horizontal_velocity: Vec3,
        dt: f32,
        ground_height: f32,
    ) -> Vec3 {
        if !self.grounded {
            self.velocity_y -= self.gravity * dt;
        }

        let mut next = position
            + Vec3::new(
                horizontal_velocity.x * dt,
                self.velocity_y * dt,
                horizontal_velocity.z * dt,
            );

        if next.y <= ground_height {
            next.y = ground_height;
            self.velocity_y = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }

        next
    }
}
