//! Navigation provider seam.
//!
//! Pathfinding is an external service: the behavior core hands it a target
//! position and consumes waypoints, never the algorithm. [`DirectPath`] is
//! the built-in provider (straight line, no obstacle awareness) used by the
//! sandbox and by worlds that have no real navigation backend wired up.

use glam::Vec3;

/// Opaque pathing service yielding waypoints toward a target position.
pub trait NavigationProvider {
    /// Replaces the current path with one toward `position`.
    fn set_target(&mut self, position: Vec3);

    /// Returns the next intermediate position along the current path.
    ///
    /// Contract: only meaningful while [`NavigationProvider::is_finished`]
    /// returns false; a finished provider may return the final target.
    fn next_waypoint(&mut self) -> Vec3;

    /// Whether the current path has been consumed (or none was ever set).
    fn is_finished(&self) -> bool;

    /// Reconciles a desired velocity against local avoidance.
    ///
    /// Providers with obstacle avoidance return an adjusted velocity; the
    /// default implementation returns the input unchanged.
    fn report_safe_velocity(&mut self, desired: Vec3) -> Vec3 {
        desired
    }

    /// Informs the provider of the agent's current position.
    ///
    /// Waypoint consumption is position-driven; the world calls this once per
    /// tick before the state handlers run.
    fn update_position(&mut self, position: Vec3);
}

/// How close an agent must get for a waypoint to count as reached.
const ARRIVAL_DISTANCE: f32 = 1.0;

/// Straight-line navigation provider.
///
/// Yields the target itself as the single waypoint and finishes when the
/// agent is within arrival distance.
#[derive(Debug, Clone, Default)]
pub struct DirectPath {
    target: Option<Vec3>,
    position: Vec3,
}

impl DirectPath {
    /// Creates a provider with no path set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl NavigationProvider for DirectPath {
    fn set_target(&mut self, position: Vec3) {
        self.target = Some(position);
    }

    fn next_waypoint(&mut self) -> Vec3 {
        self.target.unwrap_or(self.position)
    }

    fn is_finished(&self) -> bool {
        match self.target {
            Some(target) => {
                wildkin_common::horizontal_distance(self.position, target) <= ARRIVAL_DISTANCE
            }
            None => true,
        }
    }

    fn update_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

/// Scripted navigation provider for tests.
///
/// Records every call and reports whatever the test configured.
#[derive(Debug, Default)]
pub struct MockNav {
    /// Targets received through `set_target`, in order.
    pub targets_set: Vec<Vec3>,
    /// Waypoint returned by `next_waypoint`.
    pub waypoint: Vec3,
    /// Value returned by `is_finished`.
    pub finished: bool,
    /// Velocities received through `report_safe_velocity`.
    pub reported: Vec<Vec3>,
}

impl MockNav {
    /// Creates a mock with an unfinished path toward `waypoint`.
    #[must_use]
    pub fn heading_to(waypoint: Vec3) -> Self {
        Self {
            waypoint,
            ..Self::default()
        }
    }

    /// Creates a mock that always reports a finished path.
    #[must_use]
    pub fn finished() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }
}

impl NavigationProvider for MockNav {
    fn set_target(&mut self, position: Vec3) {
        self.targets_set.push(position);
    }

    fn next_waypoint(&mut self) -> Vec3 {
        self.waypoint
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn report_safe_velocity(&mut self, desired: Vec3) -> Vec3 {
        self.reported.push(desired);
        desired
    }

    fn update_position(&mut self, _position: Vec3) {}
}
