//! Computer opponent for side two
//!
//! The controller writes a [`ControlIntent`] every tick, just like a keyboard
//! would. It has two modes: a serve routine with escalating failsafes that
//! guarantees the ball is in play within a few seconds, and a rally routine
//! that predicts where the ball comes down and jumps or dives for it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input::ControlIntent;
use super::level::{AiTuning, LevelProfile};
use super::state::{GameEvent, MatchState, Side};
use crate::consts::*;
use crate::lerp;

/// Lowest x the AI may stand on while serving
const SERVE_MIN_X: f32 = WIDTH / 2.0 + 100.0;
/// Horizontal gap that triggers the emergency reposition during a serve
const EMERGENCY_DISTANCE: f32 = 800.0;

/// Memory the controller carries between ticks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    pub last_x: f32,
    /// Consecutive ticks with almost no horizontal movement
    pub stuck_timer: u32,
    pub last_jump_ms: f64,
    /// Consecutive ticks with the ball behind the player
    pub backwards_facing: u32,
    pub serve_attempt_timer: u32,
    pub serve_start_ms: Option<f64>,
    pub desperate_save_attempt: bool,
}

impl AiState {
    pub fn new(x: f32) -> Self {
        Self {
            last_x: x,
            ..Self::default()
        }
    }

    /// Forget everything (every round starts clean)
    pub fn reset(&mut self, x: f32) {
        *self = Self::new(x);
    }

    pub fn is_mid_serve(&self) -> bool {
        self.serve_attempt_timer > 0 || self.serve_start_ms.is_some()
    }
}

/// Position and velocity of the ball the controller is tracking
#[derive(Debug, Clone, Copy)]
struct Target {
    pos: Vec2,
    vel: Vec2,
}

/// Pick the ball to chase: the primary, or the closest one during multiball
fn target_ball(state: &MatchState) -> Target {
    let me = state.player(Side::Two).pos;
    let ball = if state.multiball_active {
        state
            .balls
            .iter()
            .min_by(|a, b| a.pos.distance(me).total_cmp(&b.pos.distance(me)))
            .unwrap_or(state.primary_ball())
    } else {
        state.primary_ball()
    };
    Target {
        pos: ball.pos,
        vel: ball.vel,
    }
}

/// Seconds until a body at `y` moving at `vel_y` reaches standing height
pub fn time_to_ground(y: f32, vel_y: f32, gravity: f32) -> Option<f32> {
    let a = 0.5 * gravity;
    let b = vel_y;
    let c = y - (GROUND_Y - 100.0);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a == 0.0 {
        return None;
    }
    Some((-b + disc.sqrt()) / (2.0 * a))
}

/// Decide this tick's intent for side two
///
/// May move the AI player directly (serve failsafes) or launch the ball itself
/// when a serve takes too long.
pub fn decide(state: &mut MatchState) -> ControlIntent {
    let target = target_ball(state);
    let me = state.player(Side::Two).pos.x;

    if (me - state.ai.last_x).abs() < 2.0 {
        state.ai.stuck_timer += 1;
    } else {
        state.ai.stuck_timer = 0;
    }
    state.ai.last_x = me;

    if state.is_serving() && state.serving_side == Side::Two {
        return serve(state, target);
    }
    if state.ai.is_mid_serve() {
        log::debug!("AI serve complete, clearing serve timers");
        state.ai.serve_attempt_timer = 0;
        state.ai.serve_start_ms = None;
    }
    rally(state, target)
}

fn serve(state: &mut MatchState, target: Target) -> ControlIntent {
    let now = state.now_ms();
    let start = *state.ai.serve_start_ms.get_or_insert(now);
    state.ai.serve_attempt_timer += 1;

    // Half a tick of slack so clock rounding can't push the serve past the limit
    let elapsed = now - start;
    if elapsed + TICK_MS / 2.0 >= AI_SERVE_TIMEOUT_MS {
        log::warn!("AI serve timed out after {:.0}ms, auto-serving", elapsed);
        let vx = -400.0 - state.rng.random::<f32>() * 200.0;
        state.launch_serve(Vec2::new(vx, -1200.0));
        state.stats.auto_serves += 1;
        state.events.push(GameEvent::AutoServe);
        state.ai.serve_attempt_timer = 0;
        state.ai.serve_start_ms = None;
        return ControlIntent::NONE;
    }

    let ball = target.pos;
    let timer = state.ai.serve_attempt_timer;
    let distance = ball.distance(state.player(Side::Two).pos);
    let teleport = if distance > 600.0 && timer > 20 {
        Some((Vec2::new(ball.x + 80.0, GROUND_Y - 100.0), 10))
    } else if distance > 400.0 && timer > 50 {
        Some((Vec2::new(ball.x + 60.0, GROUND_Y - 100.0), 20))
    } else if distance > 300.0 && timer > 90 {
        Some((Vec2::new(ball.x, ball.y + 50.0), 40))
    } else {
        None
    };
    if let Some((pos, rewind)) = teleport {
        log::debug!(
            "AI {:.0}px from serve ball after {} ticks, moving to ({:.0}, {:.0})",
            distance,
            timer,
            pos.x,
            pos.y
        );
        state.player_mut(Side::Two).place(pos);
        state.ai.serve_attempt_timer = rewind;
    }

    let player = state.player_mut(Side::Two);
    if player.pos.x < SERVE_MIN_X {
        log::debug!("AI crossed toward the net during serve, correcting");
        player.pos.x = SERVE_MIN_X;
        player.vel.x = 100.0;
    }
    let (x, grounded) = (player.pos.x, player.grounded);
    let timer = state.ai.serve_attempt_timer;
    let tap = timer % 2 == 0;
    let mut intent = ControlIntent::NONE;

    if timer <= 10 {
        let safe_x = ball.x.max(SERVE_MIN_X);
        if x < safe_x - 10.0 {
            intent.right = true;
        } else if x > safe_x + 10.0 {
            intent.left = true;
        }
        intent.up = tap;
        return intent;
    }

    let dx = ball.x - x;
    if x < ball.x - 15.0 {
        intent.right = true;
    } else if x > ball.x + 15.0 {
        intent.left = true;
    } else if x < ball.x - 5.0 {
        intent.right = true;
    } else if x > ball.x + 5.0 {
        intent.left = true;
    }

    if timer <= 20 {
        intent.up = tap;
    } else if timer <= 40 {
        intent.up = dx.abs() < 100.0 || tap;
    } else {
        intent.up = true;
        intent.left = x > ball.x;
        intent.right = x < ball.x;
        if timer > 60 {
            if !grounded {
                intent.down = timer % 3 == 0;
            }
            if timer > 90 && dx.abs() > 200.0 {
                let goal = ball.x + if dx > 0.0 { -100.0 } else { 100.0 };
                let player = state.player_mut(Side::Two);
                player.pos.x = lerp(player.pos.x, goal, 0.1);
            }
        }
    }
    intent
}

/// Seconds of ball travel the rally target leads by
///
/// The analytic tier solves the drop with the level's player gravity, which
/// lands earlier than the ball really does and keeps the AI ahead of it.
fn lead_time(profile: &LevelProfile, ball_y: f32, vel_y: f32) -> f32 {
    let tuning = &profile.ai;
    if tuning.analytic_prediction {
        time_to_ground(ball_y, vel_y, profile.gravity()).unwrap_or(1.0)
    } else {
        0.5 * tuning.skill
    }
}

fn rally(state: &mut MatchState, target: Target) -> ControlIntent {
    let tuning = state.profile.ai;
    let now = state.now_ms();
    let player = state.player(Side::Two);
    let (me, grounded) = (player.pos, player.grounded);
    let (ball, vel) = (target.pos, target.vel);

    let distance = (me.x - ball.x).abs();
    let on_our_side = ball.x > WIDTH / 2.0;
    let coming = vel.x > -300.0 || on_our_side;

    let lead = lead_time(&state.profile, ball.y, vel.y);
    let mut target_x = ball.x + vel.x * lead;
    if on_our_side && vel.y > 0.0 {
        target_x = ball.x + vel.x * 0.6 * tuning.skill * tuning.falling_lead;
    } else if !on_our_side {
        target_x = WIDTH * tuning.defensive_x_frac;
    }
    target_x = target_x.max(WIDTH / 2.0 + 180.0).min(WIDTH - 100.0);

    if state.ai.stuck_timer > 40 {
        target_x = WIDTH * 0.7 + state.rng.random::<f32>() * 200.0;
        state.ai.stuck_timer = 0;
    }

    let mut intent = ControlIntent::NONE;
    if me.x < target_x - tuning.move_threshold {
        intent.right = true;
    } else if me.x > target_x + tuning.move_threshold {
        intent.left = true;
    }

    let behind = ball.x < me.x - 100.0 && on_our_side;
    if behind {
        state.ai.backwards_facing += 1;
        if state.ai.backwards_facing > 20 {
            intent.left = true;
            state.ai.backwards_facing = 0;
        }
    } else {
        state.ai.backwards_facing = 0;
    }

    let vertical = me.y - ball.y;
    let in_front = ball.x >= me.x - 60.0;
    let good_spot = in_front || distance < tuning.jump_reach;
    let time_to_jump = grounded
        && coming
        && good_spot
        && distance < tuning.jump_distance
        && vertical > tuning.jump_vertical_min
        && vertical < tuning.jump_vertical_max
        && vel.y > -400.0;
    if time_to_jump && (tuning.jump_when_behind || !behind) {
        intent.up = true;
        state.ai.last_jump_ms = now;
    }

    let can_dive = !grounded && now - state.ai.last_jump_ms > tuning.dive_cooldown_ms;
    let should_dive = can_dive
        && coming
        && distance > tuning.dive_min_distance
        && distance < tuning.dive_max_distance
        && ball.y > me.y - tuning.dive_vertical
        && in_front;
    if should_dive {
        intent.down = true;
        if ball.x > me.x {
            intent.right = true;
        } else if ball.x < me.x - 50.0 {
            intent.left = true;
        }
    }

    if let Some(save) = tuning.desperate_save.filter(|_| !grounded && !should_dive) {
        let desperate = on_our_side
            && vel.y > save.min_fall_speed
            && ball.y > HEIGHT * save.low_frac
            && distance < save.range;
        if desperate {
            intent.down = true;
            intent.right = ball.x > me.x;
            intent.left = !intent.right;
            if !state.ai.desperate_save_attempt {
                log::debug!("AI desperate save");
            }
        }
        state.ai.desperate_save_attempt = desperate;
    }

    intent
}

/// Keep the serving AI within reach of the ball
///
/// Runs after player physics; a player knocked far away is snapped back next to
/// the serve position.
pub fn monitor_serve(state: &mut MatchState) {
    if !(state.is_serving() && state.serving_side == Side::Two) {
        return;
    }
    let ball_x = state.primary_ball().pos.x;
    let player = state.player_mut(Side::Two);
    if (player.pos.x - ball_x).abs() > EMERGENCY_DISTANCE {
        log::warn!("AI {:.0}px from serve ball, emergency reposition", (player.pos.x - ball_x).abs());
        player.pos.x = (ball_x + 100.0).max(SERVE_MIN_X);
    }
}

/// Horizontal velocity for a ball the AI just struck
///
/// Bends the physical strike toward a spot deep in the opponent's court and
/// never lets the ball go back toward the AI's own side.
pub fn aim_strike(vel_x: f32, ball_x: f32, tuning: &AiTuning, rng: &mut Pcg32) -> f32 {
    let spread = tuning.hit_spread;
    let aim_x = WIDTH * 0.25 + (rng.random::<f32>() * spread - spread / 2.0);
    let mut vx = vel_x * 0.4 + (aim_x - ball_x) * tuning.aim_influence;
    vx = toward_opponent(vx, rng);

    if tuning.corner_aim_chance > 0.0 && rng.random_bool(tuning.corner_aim_chance.min(1.0)) {
        let corner = if rng.random_bool(0.5) { 150.0 } else { WIDTH * 0.4 };
        vx = vx * 0.3 + (corner - ball_x) * tuning.corner_influence;
        vx = toward_opponent(vx, rng);
    }
    vx
}

fn toward_opponent(vx: f32, rng: &mut Pcg32) -> f32 {
    if vx > -100.0 {
        -300.0 - rng.random::<f32>() * 200.0
    } else {
        vx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelKind, LevelProfile};
    use crate::sim::state::MatchPhase;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn ai_serving() -> MatchState {
        let mut state = MatchState::start_match(LevelKind::Beach, 5);
        state.serving_side = Side::Two;
        state.phase = MatchPhase::Serving { side: Side::Two };
        state.primary_ball_mut().reset(Side::Two.serve_position());
        state
    }

    fn rallying(kind: LevelKind) -> MatchState {
        let mut state = MatchState::start_match(kind, 5);
        state.phase = MatchPhase::Rallying;
        state.primary_ball_mut().gravity_enabled = true;
        state.player_mut(Side::Two).grounded = true;
        state
    }

    #[test]
    fn test_time_to_ground() {
        // Dropped from rest 100px above standing height under 2000 px/s^2
        let t = time_to_ground(GROUND_Y - 200.0, 0.0, 2000.0).expect("reaches ground");
        assert!((t - 0.316).abs() < 0.01);
        assert_eq!(time_to_ground(0.0, 0.0, 0.0), None);
    }

    #[test]
    fn test_serve_timeout_launches_ball() {
        let mut state = ai_serving();
        state.ai.serve_attempt_timer = 150;
        state.ai.serve_start_ms = Some(0.0);
        state.clock_ms = AI_SERVE_TIMEOUT_MS + 20.0;

        let intent = decide(&mut state);
        assert!(intent.is_idle());
        assert_eq!(state.phase, MatchPhase::Rallying);
        assert!(state.events.contains(&GameEvent::AutoServe));
        let ball = state.primary_ball();
        assert!(ball.gravity_enabled);
        assert_eq!(ball.vel.y, -1200.0);
        assert!((-600.0..=-400.0).contains(&ball.vel.x));
        assert!(!state.ai.is_mid_serve());
    }

    #[test]
    fn test_serve_timeout_within_three_seconds_of_reset() {
        let mut state = MatchState::start_match(LevelKind::Beach, 8);
        state.serving_side = Side::Two;
        state.clock_ms = 500.0;
        state.reset_round();
        let start = state.clock_ms;
        assert_eq!(state.ai.serve_start_ms, Some(start));

        let mut ticks = 0;
        while state.is_serving() {
            state.clock_ms += TICK_MS;
            ticks += 1;
            decide(&mut state);
            assert!(ticks <= 200);
        }
        assert_eq!(ticks, (AI_SERVE_TIMEOUT_MS / TICK_MS).round() as u32);
        assert!(state.clock_ms - start <= AI_SERVE_TIMEOUT_MS + 1e-6);
        assert_eq!(state.stats.auto_serves, 1);
    }

    #[test]
    fn test_hell_lead_uses_player_gravity() {
        let hell = LevelProfile::for_level(LevelKind::Hell);
        let y = GROUND_Y - 500.0;
        let lead = lead_time(&hell, y, -200.0);
        let expected = time_to_ground(y, -200.0, hell.gravity()).expect("falls");
        assert_eq!(lead, expected);
        let slower = time_to_ground(y, -200.0, hell.ball_gravity()).expect("falls");
        assert!(lead < slower);

        let beach = LevelProfile::for_level(LevelKind::Beach);
        assert_eq!(lead_time(&beach, y, -200.0), 0.5 * beach.ai.skill);
    }

    #[test]
    fn test_far_ai_teleports_toward_serve_ball() {
        let mut state = ai_serving();
        state.player_mut(Side::Two).place(Vec2::new(1000.0, GROUND_Y - 100.0));
        state.ai.last_x = 1000.0;
        state.ai.serve_attempt_timer = 25;
        state.ai.serve_start_ms = Some(0.0);

        decide(&mut state);
        let ball_x = state.primary_ball().pos.x;
        assert_eq!(state.player(Side::Two).pos.x, ball_x + 80.0);
        assert_eq!(state.ai.serve_attempt_timer, 10);
    }

    #[test]
    fn test_serve_keeps_ai_off_the_net() {
        let mut state = ai_serving();
        state.player_mut(Side::Two).pos.x = NET_X + 20.0;
        decide(&mut state);
        assert!(state.player(Side::Two).pos.x >= SERVE_MIN_X);
    }

    #[test]
    fn test_emergency_reposition() {
        let mut state = ai_serving();
        state.primary_ball_mut().pos.x = 1000.0;
        state.player_mut(Side::Two).pos.x = WIDTH - 80.0;
        monitor_serve(&mut state);
        assert_eq!(state.player(Side::Two).pos.x, 1100.0);

        state.primary_ball_mut().pos.x = 100.0;
        state.player_mut(Side::Two).pos.x = WIDTH - 80.0;
        monitor_serve(&mut state);
        assert_eq!(state.player(Side::Two).pos.x, SERVE_MIN_X);
    }

    #[test]
    fn test_leaving_serve_clears_timers() {
        let mut state = rallying(LevelKind::Beach);
        state.ai.serve_attempt_timer = 30;
        state.ai.serve_start_ms = Some(100.0);
        decide(&mut state);
        assert!(!state.ai.is_mid_serve());
    }

    #[test]
    fn test_returns_to_defense_when_ball_is_away() {
        let mut state = rallying(LevelKind::Beach);
        state.primary_ball_mut().pos = Vec2::new(400.0, 300.0);
        state.primary_ball_mut().vel = Vec2::new(-200.0, 0.0);
        state.player_mut(Side::Two).pos.x = WIDTH - 120.0;
        let intent = decide(&mut state);
        assert!(intent.left);
        assert!(!intent.up);
    }

    #[test]
    fn test_chases_falling_ball() {
        let mut state = rallying(LevelKind::Beach);
        state.player_mut(Side::Two).pos.x = 1200.0;
        state.primary_ball_mut().pos = Vec2::new(1500.0, 500.0);
        state.primary_ball_mut().vel = Vec2::new(100.0, 200.0);
        let intent = decide(&mut state);
        assert!(intent.right);
    }

    #[test]
    fn test_jumps_for_ball_overhead() {
        let mut state = rallying(LevelKind::Beach);
        let me = state.player(Side::Two).pos;
        state.primary_ball_mut().pos = Vec2::new(me.x + 20.0, me.y - 250.0);
        state.primary_ball_mut().vel = Vec2::new(0.0, 100.0);
        state.clock_ms = 1234.0;
        let intent = decide(&mut state);
        assert!(intent.up);
        assert_eq!(state.ai.last_jump_ms, 1234.0);
    }

    #[test]
    fn test_stuck_timer_forces_move() {
        let mut state = rallying(LevelKind::Beach);
        state.ai.stuck_timer = 41;
        state.ai.last_x = state.player(Side::Two).pos.x;
        decide(&mut state);
        assert_eq!(state.ai.stuck_timer, 0);
    }

    #[test]
    fn test_hell_desperate_save() {
        let mut state = rallying(LevelKind::Hell);
        let player = state.player_mut(Side::Two);
        player.grounded = false;
        player.pos = Vec2::new(1300.0, 500.0);
        // Behind the player so a normal dive is ruled out
        state.primary_ball_mut().pos = Vec2::new(1100.0, 800.0);
        state.primary_ball_mut().vel = Vec2::new(0.0, 600.0);
        let intent = decide(&mut state);
        assert!(intent.down);
        assert!(intent.left);
        assert!(state.ai.desperate_save_attempt);
    }

    #[test]
    fn test_multiball_tracks_nearest_ball() {
        let mut state = rallying(LevelKind::Beach);
        state.activate_multiball();
        let me = state.player(Side::Two).pos;
        state.balls[2].pos = me + Vec2::new(10.0, -200.0);
        state.primary_ball_mut().pos = Vec2::new(300.0, 300.0);
        let target = target_ball(&state);
        assert_eq!(target.pos, state.balls[2].pos);
    }

    proptest! {
        #[test]
        fn prop_ai_strikes_go_toward_opponent(
            vel_x in -2000.0f32..2000.0,
            ball_x in (WIDTH / 2.0)..WIDTH,
            seed in any::<u64>(),
            hell in any::<bool>(),
        ) {
            let kind = if hell { LevelKind::Hell } else { LevelKind::Beach };
            let tuning = LevelProfile::for_level(kind).ai;
            let mut rng = Pcg32::seed_from_u64(seed);
            let vx = aim_strike(vel_x, ball_x, &tuning, &mut rng);
            prop_assert!(vx <= -100.0);
        }
    }
}
