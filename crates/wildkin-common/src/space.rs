//! Horizontal-plane spatial helpers.
//!
//! Creature decision making works on the ground plane: detection, attack and
//! flee distances all ignore height, and facing is a yaw-only rotation.
//! These helpers keep that convention in one place.

use glam::Vec3;

/// Distance between two points projected onto the XZ plane.
#[must_use]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit direction from `from` to `to` on the XZ plane.
///
/// Returns `Vec3::ZERO` when the points coincide (within epsilon), so callers
/// can scale the result without a divide-by-zero check.
#[must_use]
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let len = flat.length();
    if len < 1e-4 {
        Vec3::ZERO
    } else {
        flat / len
    }
}

/// Yaw angle (radians) looking from `from` toward `to` on the XZ plane.
#[must_use]
pub fn facing_angle(from: Vec3, to: Vec3) -> f32 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    dz.atan2(dx)
}
