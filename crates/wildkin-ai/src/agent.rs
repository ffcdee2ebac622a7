//! Agent data model: dispositions, states, configuration and per-creature
//! mutable state.
//!
//! The state machine logic itself lives in [`crate::brain`]; this module owns
//! the data and the small mutations every other part of the core goes
//! through (state transitions, health changes, target bookkeeping).

use glam::Vec3;
use serde::{Deserialize, Serialize};
use wildkin_common::EntityId;

use crate::loot::DropTable;
use crate::movement::GravityBody;

/// Behavioral category determining an agent's decision after Alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    /// Flees from threats, never attacks.
    Passive,
    /// Ignores threats until provoked; escalates to Aggressive when damaged.
    Neutral,
    /// Chases and attacks detected targets.
    Aggressive,
}

/// Behavior states an agent can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Standing still, waiting to wander.
    Idle,
    /// Walking toward a random point near home.
    Wander,
    /// Target detected, deciding what to do.
    Alert,
    /// Running toward the target.
    Chase,
    /// Running away from the target.
    Flee,
    /// In range, attacking the target.
    Attack,
}

/// Immutable per-creature tunables, injected at construction.
///
/// Loaded externally (species presets, RON files); the behavior core never
/// mutates a config after spawn. Fields omitted from a preset file fall
/// back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Initial behavioral category.
    pub disposition: Disposition,
    /// Movement speed while wandering.
    pub walk_speed: f32,
    /// Movement speed while chasing or fleeing.
    pub run_speed: f32,
    /// Radius of the perception zone.
    pub detection_range: f32,
    /// Maximum distance at which attacks connect.
    pub attack_range: f32,
    /// Damage applied per attack.
    pub attack_damage: f32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
    /// Health at spawn; health never exceeds this.
    pub max_health: f32,
    /// Maximum distance of wander points from home.
    pub wander_radius: f32,
    /// What the creature drops on death, if anything.
    pub drop: Option<DropTable>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            disposition: Disposition::Passive,
            walk_speed: 2.0,
            run_speed: 6.0,
            detection_range: 15.0,
            attack_range: 2.0,
            attack_damage: 10.0,
            attack_cooldown: 1.5,
            max_health: 50.0,
            wander_radius: 20.0,
            drop: None,
        }
    }
}

impl AgentConfig {
    /// Creates a config with the given disposition and defaults elsewhere.
    #[must_use]
    pub fn new(disposition: Disposition) -> Self {
        Self {
            disposition,
            ..Self::default()
        }
    }

    /// Sets walk and run speeds.
    #[must_use]
    pub const fn with_speeds(mut self, walk: f32, run: f32) -> Self {
        self.walk_speed = walk;
        self.run_speed = run;
        self
    }

    /// Sets the detection range.
    #[must_use]
    pub const fn with_detection_range(mut self, range: f32) -> Self {
        self.detection_range = range;
        self
    }

    /// Sets attack range, damage and cooldown.
    #[must_use]
    pub const fn with_attack(mut self, range: f32, damage: f32, cooldown: f32) -> Self {
        self.attack_range = range;
        self.attack_damage = damage;
        self.attack_cooldown = cooldown;
        self
    }

    /// Sets maximum health.
    #[must_use]
    pub const fn with_max_health(mut self, health: f32) -> Self {
        self.max_health = health;
        self
    }

    /// Sets the wander radius.
    #[must_use]
    pub const fn with_wander_radius(mut self, radius: f32) -> Self {
        self.wander_radius = radius;
        self
    }

    /// Sets the drop table.
    #[must_use]
    pub fn with_drop(mut self, drop: DropTable) -> Self {
        self.drop = Some(drop);
        self
    }
}

/// Outcome of applying damage to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Health reduced, nothing else changed.
    Hurt,
    /// A Neutral agent escalated to Aggressive and turned to chase.
    Escalated,
    /// Health reached zero on this hit; death fires exactly once.
    Died,
    /// The agent was already dead; the call was a no-op.
    AlreadyDead,
}

/// State of an individual creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: EntityId,
    config: AgentConfig,
    disposition: Disposition,
    state: AgentState,
    state_timer: f32,
    /// Threshold for leaving Idle; 0 means "draw a fresh one next tick".
    idle_dwell: f32,
    attack_timer: f32,
    health: f32,
    dead: bool,
    target: Option<EntityId>,
    position: Vec3,
    facing: f32,
    home_position: Vec3,
    wander_target: Vec3,
    desired_velocity: Vec3,
    gravity: GravityBody,
}

impl Agent {
    /// Creates a live agent at the given position with full health.
    #[must_use]
    pub fn new(id: EntityId, config: AgentConfig, position: Vec3) -> Self {
        Self {
            id,
            disposition: config.disposition,
            state: AgentState::Idle,
            state_timer: 0.0,
            idle_dwell: 0.0,
            attack_timer: 0.0,
            health: config.max_health,
            dead: false,
            target: None,
            position,
            facing: 0.0,
            home_position: position,
            wander_target: position,
            desired_velocity: Vec3::ZERO,
            gravity: GravityBody::default(),
            config,
        }
    }

    /// The agent's entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// The immutable configuration this agent was spawned with.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current behavioral category. Starts as the configured disposition and
    /// may escalate permanently (Neutral to Aggressive) when damaged.
    #[must_use]
    pub const fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Current behavior state.
    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Seconds spent in the current state.
    #[must_use]
    pub const fn state_timer(&self) -> f32 {
        self.state_timer
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Whether the agent has not yet died.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Current tracked target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Yaw the agent is facing, in radians.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Position the agent considers home; fixed at spawn.
    #[must_use]
    pub const fn home_position(&self) -> Vec3 {
        self.home_position
    }

    /// Current wander destination; meaningful while in Wander.
    #[must_use]
    pub const fn wander_target(&self) -> Vec3 {
        self.wander_target
    }

    /// Horizontal velocity requested by the state machine this tick.
    ///
    /// Vertical velocity is owned by the gravity integrator, never by the
    /// state machine.
    #[must_use]
    pub const fn desired_velocity(&self) -> Vec3 {
        self.desired_velocity
    }

    /// Seconds left on the attack cooldown; attacks are permitted at <= 0.
    #[must_use]
    pub const fn attack_timer(&self) -> f32 {
        self.attack_timer
    }

    /// Transitions to a new state, resetting the state timer.
    ///
    /// Same-state transitions are ignored so the timer keeps running.
    pub(crate) fn set_state(&mut self, new_state: AgentState) {
        if self.state == new_state {
            return;
        }
        self.state = new_state;
        self.state_timer = 0.0;
        if new_state == AgentState::Idle {
            self.idle_dwell = 0.0;
        }
    }

    pub(crate) fn advance_timers(&mut self, dt: f32) {
        self.state_timer += dt;
        self.attack_timer -= dt;
    }

    pub(crate) const fn idle_dwell(&self) -> f32 {
        self.idle_dwell
    }

    pub(crate) fn set_idle_dwell(&mut self, dwell: f32) {
        self.idle_dwell = dwell;
    }

    pub(crate) fn reset_attack_cooldown(&mut self) {
        self.attack_timer = self.config.attack_cooldown;
    }

    pub(crate) fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn set_facing(&mut self, facing: f32) {
        self.facing = facing;
    }

    pub(crate) fn set_wander_target(&mut self, target: Vec3) {
        self.wander_target = target;
    }

    pub(crate) fn set_desired_velocity(&mut self, velocity: Vec3) {
        self.desired_velocity = velocity;
    }

    pub(crate) fn gravity_mut(&mut self) -> &mut GravityBody {
        &mut self.gravity
    }

    /// Perception callback: a trackable entity entered detection range.
    ///
    /// The entity becomes the tracked target. Agents busy chasing, fleeing or
    /// attacking keep their current state; Idle and Wander turn to Alert.
    pub fn on_target_entered(&mut self, entity: EntityId) {
        if self.dead {
            return;
        }
        self.target = Some(entity);
        if matches!(self.state, AgentState::Idle | AgentState::Wander) {
            self.set_state(AgentState::Alert);
        }
    }

    /// Perception callback: a trackable entity left detection range.
    ///
    /// Only drops the target if the exiting entity is the tracked one and the
    /// agent is still deciding (Alert); chase and flee resolve target loss by
    /// distance instead. Calling this with any other entity has no effect.
    pub fn on_target_exited(&mut self, entity: EntityId) {
        if self.dead {
            return;
        }
        if self.target == Some(entity) && self.state == AgentState::Alert {
            self.target = None;
            self.set_state(AgentState::Idle);
        }
    }

    /// Applies damage, clamping health to `[0, max_health]`.
    ///
    /// The attacker (when given) becomes the tracked target so loot can be
    /// attributed. A Neutral agent that survives a hit with a target set
    /// escalates to Aggressive permanently and turns to chase. Returns what
    /// happened; callers resolve loot and events on [`DamageOutcome::Died`].
    pub fn take_damage(&mut self, amount: f32, attacker: Option<EntityId>) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::AlreadyDead;
        }

        self.health = (self.health - amount).clamp(0.0, self.config.max_health);

        if let Some(attacker) = attacker {
            self.target = Some(attacker);
        }

        if self.health <= 0.0 {
            self.dead = true;
            return DamageOutcome::Died;
        }

        if self.disposition == Disposition::Neutral && self.target.is_some() {
            self.disposition = Disposition::Aggressive;
            self.set_state(AgentState::Chase);
            return DamageOutcome::Escalated;
        }

        DamageOutcome::Hurt
    }
}
