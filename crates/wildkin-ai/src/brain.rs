//! Per-tick behavior state machine.
//!
//! One call to [`update`] per agent per simulation step: advance timers,
//! run the handler for the current state, and possibly hand back an attack
//! command for the world to resolve. Handlers only ever emit a horizontal
//! desired velocity and a facing; integration happens elsewhere.
//!
//! Transition rules:
//! - Idle: dwell for a random 2-7 s, then wander.
//! - Wander: walk to a random point near home; stop when the path finishes
//!   or after 10 s.
//! - Alert: face the target for 1.5 s, then commit - Passive flees,
//!   Aggressive chases, Neutral goes back to idle.
//! - Chase: run at the target, refreshed every tick; give up beyond 1.5x
//!   detection range; attack within attack range.
//! - Flee: run away from the target; calm down beyond 2x detection range.
//! - Attack: bite when the cooldown allows; fall back to chase when the
//!   target slips out to 1.5x attack range.
//!
//! A missing navigation provider turns movement into a no-op while timers
//! and transitions keep evaluating. A target that no longer resolves always
//! forces Idle.

use glam::Vec3;
use wildkin_common::{facing_angle, horizontal_direction, horizontal_distance};

use crate::agent::{Agent, AgentState, Disposition};
use crate::navigation::NavigationProvider;

/// Seconds an agent waits in Alert before committing to a reaction.
const ALERT_DECISION_DELAY: f32 = 1.5;
/// Seconds after which a wander leg is abandoned.
const WANDER_TIME_LIMIT: f32 = 10.0;
/// Shortest Idle dwell, seconds.
const IDLE_DWELL_MIN: f32 = 2.0;
/// Longest Idle dwell, seconds.
const IDLE_DWELL_MAX: f32 = 7.0;
/// How far ahead of the agent the flee point is placed.
const FLEE_OFFSET: f32 = 20.0;
/// Chase gives up beyond this multiple of detection range.
const CHASE_LEASH_FACTOR: f32 = 1.5;
/// Flee calms down beyond this multiple of detection range.
const FLEE_SAFE_FACTOR: f32 = 2.0;
/// Attack hands back to chase beyond this multiple of attack range.
const ATTACK_BREAK_FACTOR: f32 = 1.5;

/// Everything a state handler may touch beyond the agent itself.
pub struct TickCtx<'a> {
    /// Navigation provider for this agent, if one is attached.
    pub nav: Option<&'a mut dyn NavigationProvider>,
    /// Resolved position of the tracked target; `None` when there is no
    /// target or the reference went stale.
    pub target_position: Option<Vec3>,
    /// World RNG, used for idle dwell and wander point draws.
    pub rng: &'a mut fastrand::Rng,
}

/// Side effect requested by a state handler, resolved by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrainCommand {
    /// Apply one attack to the tracked target.
    Attack,
}

/// Advances one agent by one tick. No-op for dead agents.
pub fn update(agent: &mut Agent, dt: f32, ctx: &mut TickCtx<'_>) -> Option<BrainCommand> {
    if !agent.is_alive() {
        return None;
    }

    agent.advance_timers(dt);
    agent.set_desired_velocity(Vec3::ZERO);
    if let Some(nav) = ctx.nav.as_deref_mut() {
        nav.update_position(agent.position());
    }

    match agent.state() {
        AgentState::Idle => {
            idle(agent, ctx);
            None
        }
        AgentState::Wander => {
            wander(agent, ctx);
            None
        }
        AgentState::Alert => {
            alert(agent, ctx);
            None
        }
        AgentState::Chase => {
            chase(agent, ctx);
            None
        }
        AgentState::Flee => {
            flee(agent, ctx);
            None
        }
        AgentState::Attack => attack(agent, ctx),
    }
}

/// Transitions with entry actions applied.
fn transition(agent: &mut Agent, next: AgentState, ctx: &mut TickCtx<'_>) {
    agent.set_state(next);
    if next == AgentState::Wander {
        enter_wander(agent, ctx);
    }
}

/// Wander entry: pick a random point within the wander radius of home and
/// hand it to the navigation provider.
fn enter_wander(agent: &mut Agent, ctx: &mut TickCtx<'_>) {
    let angle = ctx.rng.f32() * std::f32::consts::TAU;
    let distance = ctx.rng.f32() * agent.config().wander_radius;
    let home = agent.home_position();
    let target = home + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

    agent.set_wander_target(target);
    if let Some(nav) = ctx.nav.as_deref_mut() {
        nav.set_target(target);
    }
}

fn idle(agent: &mut Agent, ctx: &mut TickCtx<'_>) {
    if agent.idle_dwell() <= 0.0 {
        let dwell = IDLE_DWELL_MIN + ctx.rng.f32() * (IDLE_DWELL_MAX - IDLE_DWELL_MIN);
        agent.set_idle_dwell(dwell);
    }

    if agent.state_timer() > agent.idle_dwell() {
        transition(agent, AgentState::Wander, ctx);
    }
}

fn wander(agent: &mut Agent, ctx: &mut TickCtx<'_>) {
    let path_finished = ctx.nav.as_deref().is_some_and(|nav| nav.is_finished());
    if path_finished {
        transition(agent, AgentState::Idle, ctx);
        return;
    }

    let walk_speed = agent.config().walk_speed;
    move_along_path(agent, ctx, walk_speed);

    if agent.state_timer() > WANDER_TIME_LIMIT {
        transition(agent, AgentState::Idle, ctx);
    }
}

fn alert(agent: &mut Agent, ctx: &mut TickCtx<'_>) {
    let Some(target_position) = ctx.target_position else {
        agent.set_target(None);
        transition(agent, AgentState::Idle, ctx);
        return;
    };

    agent.set_facing(facing_angle(agent.position(), target_position));

    if agent.state_timer() > ALERT_DECISION_DELAY {
        match agent.disposition() {
            Disposition::Passive => transition(agent, AgentState::Flee, ctx),
            Disposition::Aggressive => transition(agent, AgentState::Chase, ctx),
            // Neutral creatures only fight back when provoked.
            Disposition::Neutral => transition(agent, AgentState::Idle, ctx),
        }
    }
}

fn chase(agent: &mut Agent, ctx: &mut TickCtx<'_>) {
    let Some(target_position) = ctx.target_position else {
        agent.set_target(None);
        transition(agent, AgentState::Idle, ctx);
        return;
    };

    let distance = horizontal_distance(agent.position(), target_position);

    if distance > agent.config().detection_range * CHASE_LEASH_FACTOR {
        // Lost it.
        agent.set_target(None);
        transition(agent, AgentState::Idle, ctx);
        return;
    }

    if distance <= agent.config().attack_range {
        transition(agent, AgentState::Attack, ctx);
        return;
    }

    // Refresh the path toward the moving target every tick.
    if let Some(nav) = ctx.nav.as_deref_mut() {
        nav.set_target(target_position);
    }
    let run_speed = agent.config().run_speed;
    move_along_path(agent, ctx, run_speed);
}

fn flee(agent: &mut Agent, ctx: &mut TickCtx<'_>) {
    let Some(target_position) = ctx.target_position else {
        agent.set_target(None);
        transition(agent, AgentState::Idle, ctx);
        return;
    };

    let distance = horizontal_distance(agent.position(), target_position);

    if distance > agent.config().detection_range * FLEE_SAFE_FACTOR {
        // Safe distance reached.
        transition(agent, AgentState::Idle, ctx);
        return;
    }

    let away = horizontal_direction(target_position, agent.position());
    let flee_target = agent.position() + away * FLEE_OFFSET;
    if let Some(nav) = ctx.nav.as_deref_mut() {
        nav.set_target(flee_target);
    }
    let run_speed = agent.config().run_speed;
    move_along_path(agent, ctx, run_speed);
}

fn attack(agent: &mut Agent, ctx: &mut TickCtx<'_>) -> Option<BrainCommand> {
    let Some(target_position) = ctx.target_position else {
        agent.set_target(None);
        transition(agent, AgentState::Idle, ctx);
        return None;
    };

    let distance = horizontal_distance(agent.position(), target_position);

    if distance > agent.config().attack_range * ATTACK_BREAK_FACTOR {
        transition(agent, AgentState::Chase, ctx);
        return None;
    }

    agent.set_facing(facing_angle(agent.position(), target_position));

    if agent.attack_timer() <= 0.0 {
        agent.reset_attack_cooldown();
        return Some(BrainCommand::Attack);
    }
    None
}

/// Requests the next waypoint and derives the horizontal velocity toward it.
///
/// The velocity goes through the provider's safe-velocity reconciliation
/// before it lands on the agent. Movement also turns the agent to face its
/// direction of travel.
fn move_along_path(agent: &mut Agent, ctx: &mut TickCtx<'_>, speed: f32) {
    let Some(nav) = ctx.nav.as_deref_mut() else {
        return;
    };
    if nav.is_finished() {
        return;
    }

    let next = nav.next_waypoint();
    let direction = horizontal_direction(agent.position(), next);
    if direction == Vec3::ZERO {
        return;
    }

    let velocity = nav.report_safe_velocity(direction * speed);
    agent.set_desired_velocity(velocity);
    agent.set_facing(direction.z.atan2(direction.x));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::navigation::MockNav;
    use wildkin_common::EntityId;

    const DT: f32 = 1.0 / 60.0;

    fn test_agent(disposition: Disposition) -> Agent {
        Agent::new(
            EntityId::new(),
            AgentConfig::new(disposition),
            Vec3::ZERO,
        )
    }

    fn tick(
        agent: &mut Agent,
        dt: f32,
        nav: Option<&mut MockNav>,
        target_position: Option<Vec3>,
        rng: &mut fastrand::Rng,
    ) -> Option<BrainCommand> {
        let mut ctx = TickCtx {
            nav: nav.map(|n| n as &mut dyn NavigationProvider),
            target_position,
            rng,
        };
        update(agent, dt, &mut ctx)
    }

    #[test]
    fn test_idle_starts_wandering_after_dwell() {
        let mut agent = test_agent(Disposition::Passive);
        let mut nav = MockNav::heading_to(Vec3::new(5.0, 0.0, 5.0));
        let mut rng = fastrand::Rng::with_seed(1);

        // The dwell threshold never exceeds 7 seconds.
        for _ in 0..((8.0 / DT) as usize) {
            tick(&mut agent, DT, Some(&mut nav), None, &mut rng);
            if agent.state() == AgentState::Wander {
                break;
            }
        }

        assert_eq!(agent.state(), AgentState::Wander);
        assert_eq!(nav.targets_set.len(), 1);
    }

    #[test]
    fn test_idle_dwell_is_at_least_two_seconds() {
        let mut agent = test_agent(Disposition::Passive);
        let mut nav = MockNav::heading_to(Vec3::ONE);
        let mut rng = fastrand::Rng::with_seed(1);

        for _ in 0..((1.9 / DT) as usize) {
            tick(&mut agent, DT, Some(&mut nav), None, &mut rng);
        }
        assert_eq!(agent.state(), AgentState::Idle);
    }

    #[test]
    fn test_wander_target_stays_within_radius_of_home() {
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..50 {
            let mut agent = test_agent(Disposition::Passive);
            let mut nav = MockNav::heading_to(Vec3::ZERO);
            let mut ctx = TickCtx {
                nav: Some(&mut nav),
                target_position: None,
                rng: &mut rng,
            };
            transition(&mut agent, AgentState::Wander, &mut ctx);

            let distance =
                horizontal_distance(agent.home_position(), agent.wander_target());
            assert!(distance <= agent.config().wander_radius + 1e-3);
        }
    }

    #[test]
    fn test_wander_moves_at_walk_speed() {
        let mut agent = test_agent(Disposition::Passive);
        let mut nav = MockNav::heading_to(Vec3::new(10.0, 0.0, 0.0));
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_state(AgentState::Wander);

        tick(&mut agent, DT, Some(&mut nav), None, &mut rng);

        let velocity = agent.desired_velocity();
        assert!((velocity.length() - agent.config().walk_speed).abs() < 1e-3);
        assert_eq!(velocity.y, 0.0);
        assert_eq!(nav.reported.len(), 1);
    }

    #[test]
    fn test_wander_ends_when_path_finishes() {
        let mut agent = test_agent(Disposition::Passive);
        let mut nav = MockNav::finished();
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_state(AgentState::Wander);

        tick(&mut agent, DT, Some(&mut nav), None, &mut rng);
        assert_eq!(agent.state(), AgentState::Idle);
    }

    #[test]
    fn test_wander_times_out_after_ten_seconds() {
        let mut agent = test_agent(Disposition::Passive);
        let mut nav = MockNav::heading_to(Vec3::new(1000.0, 0.0, 0.0));
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_state(AgentState::Wander);

        for _ in 0..((10.5 / DT) as usize) {
            tick(&mut agent, DT, Some(&mut nav), None, &mut rng);
        }
        assert_eq!(agent.state(), AgentState::Idle);
    }

    #[test]
    fn test_missing_navigation_degrades_to_standing_still() {
        let mut agent = test_agent(Disposition::Passive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_state(AgentState::Wander);

        for _ in 0..((10.5 / DT) as usize) {
            tick(&mut agent, DT, None, None, &mut rng);
            assert_eq!(agent.desired_velocity(), Vec3::ZERO);
        }

        // Transitions still evaluate: the wander timer expired.
        assert_eq!(agent.state(), AgentState::Idle);
    }

    #[test]
    fn test_alert_without_target_returns_to_idle() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_state(AgentState::Alert);

        tick(&mut agent, DT, None, None, &mut rng);
        assert_eq!(agent.state(), AgentState::Idle);
    }

    #[test]
    fn test_alert_faces_target_while_deciding() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.on_target_entered(EntityId::new());
        assert_eq!(agent.state(), AgentState::Alert);

        tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(0.0, 0.0, 10.0)),
            &mut rng,
        );

        assert!((agent.facing() - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
        assert_eq!(agent.state(), AgentState::Alert);
    }

    fn run_alert_until_decision(disposition: Disposition) -> AgentState {
        let mut agent = test_agent(disposition);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.on_target_entered(EntityId::new());

        for _ in 0..((2.0 / DT) as usize) {
            tick(
                &mut agent,
                DT,
                None,
                Some(Vec3::new(5.0, 0.0, 0.0)),
                &mut rng,
            );
            if agent.state() != AgentState::Alert {
                break;
            }
        }
        agent.state()
    }

    #[test]
    fn test_passive_flees_after_alert() {
        assert_eq!(run_alert_until_decision(Disposition::Passive), AgentState::Flee);
    }

    #[test]
    fn test_aggressive_chases_after_alert() {
        assert_eq!(run_alert_until_decision(Disposition::Aggressive), AgentState::Chase);
    }

    #[test]
    fn test_neutral_stands_down_after_alert() {
        assert_eq!(run_alert_until_decision(Disposition::Neutral), AgentState::Idle);
    }

    #[test]
    fn test_chase_refreshes_navigation_target_every_tick() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut nav = MockNav::heading_to(Vec3::new(10.0, 0.0, 0.0));
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Chase);

        let first = Vec3::new(10.0, 0.0, 0.0);
        let second = Vec3::new(11.0, 0.0, 0.0);
        tick(&mut agent, DT, Some(&mut nav), Some(first), &mut rng);
        tick(&mut agent, DT, Some(&mut nav), Some(second), &mut rng);

        assert_eq!(nav.targets_set, vec![first, second]);
        assert_eq!(agent.state(), AgentState::Chase);
    }

    #[test]
    fn test_chase_runs_at_run_speed() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut nav = MockNav::heading_to(Vec3::new(10.0, 0.0, 0.0));
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Chase);

        tick(
            &mut agent,
            DT,
            Some(&mut nav),
            Some(Vec3::new(10.0, 0.0, 0.0)),
            &mut rng,
        );

        let velocity = agent.desired_velocity();
        assert!((velocity.length() - agent.config().run_speed).abs() < 1e-3);
    }

    #[test]
    fn test_chase_gives_up_beyond_leash_distance() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Chase);

        let leash = agent.config().detection_range * 1.5;
        tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(leash + 1.0, 0.0, 0.0)),
            &mut rng,
        );

        assert_eq!(agent.state(), AgentState::Idle);
        assert_eq!(agent.target(), None);
    }

    #[test]
    fn test_chase_closes_into_attack() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Chase);

        tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(1.0, 0.0, 0.0)),
            &mut rng,
        );

        assert_eq!(agent.state(), AgentState::Attack);
    }

    #[test]
    fn test_stale_target_forces_idle_from_chase() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Chase);

        // Target set, but the reference no longer resolves.
        tick(&mut agent, DT, None, None, &mut rng);

        assert_eq!(agent.state(), AgentState::Idle);
        assert_eq!(agent.target(), None);
    }

    #[test]
    fn test_flee_heads_directly_away_from_threat() {
        let mut agent = test_agent(Disposition::Passive);
        let mut nav = MockNav::heading_to(Vec3::new(-20.0, 0.0, 0.0));
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Flee);

        tick(
            &mut agent,
            DT,
            Some(&mut nav),
            Some(Vec3::new(5.0, 0.0, 0.0)),
            &mut rng,
        );

        // Threat at +X, so the flee point sits at -X.
        assert_eq!(nav.targets_set.len(), 1);
        assert!(nav.targets_set[0].x < 0.0);
        assert!((nav.targets_set[0].x - (-FLEE_OFFSET)).abs() < 1e-3);
    }

    #[test]
    fn test_flee_calms_down_at_safe_distance() {
        let mut agent = test_agent(Disposition::Passive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Flee);

        let safe = agent.config().detection_range * 2.0;
        tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(safe + 1.0, 0.0, 0.0)),
            &mut rng,
        );

        assert_eq!(agent.state(), AgentState::Idle);
    }

    #[test]
    fn test_attack_fires_once_per_cooldown() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Attack);

        let target = Some(Vec3::new(1.0, 0.0, 0.0));
        let cooldown = agent.config().attack_cooldown;
        let ticks = ((cooldown * 2.5) / DT) as usize;

        let mut attacks = 0;
        for _ in 0..ticks {
            if tick(&mut agent, DT, None, target, &mut rng) == Some(BrainCommand::Attack) {
                attacks += 1;
            }
        }

        // 2.5 cooldown periods: the opening attack plus two cooled-down ones.
        assert_eq!(attacks, 3);
    }

    #[test]
    fn test_attack_faces_target() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Attack);
        agent.set_facing(0.0);

        tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(-1.0, 0.0, 0.0)),
            &mut rng,
        );

        assert!((agent.facing().abs() - std::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn test_attack_breaks_back_into_chase() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.set_target(Some(EntityId::new()));
        agent.set_state(AgentState::Attack);

        let break_distance = agent.config().attack_range * 1.5 + 0.5;
        let command = tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(break_distance, 0.0, 0.0)),
            &mut rng,
        );

        assert_eq!(command, None);
        assert_eq!(agent.state(), AgentState::Chase);
    }

    #[test]
    fn test_dead_agent_never_updates() {
        let mut agent = test_agent(Disposition::Aggressive);
        let mut rng = fastrand::Rng::with_seed(1);
        agent.take_damage(1_000.0, None);
        agent.set_state(AgentState::Attack);

        let command = tick(
            &mut agent,
            DT,
            None,
            Some(Vec3::new(1.0, 0.0, 0.0)),
            &mut rng,
        );

        assert_eq!(command, None);
        assert_eq!(agent.state_timer(), 0.0);
    }
}
