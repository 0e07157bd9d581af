//! Fixed timestep simulation tick
//!
//! Core match loop that advances the simulation deterministically. Order per
//! tick: AI decision, player physics, court limits, ball physics, contact
//! resolution, power-up update, phase transitions, scheduled events.

use super::ai;
use super::input::{ControlSource, IntentSource};
use super::physics::Contacts;
use super::state::MatchState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Controls for the human side
    pub player_one: ControlSource,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.pause {
        state.toggle_pause();
    }
    // Don't tick if paused or finished
    if state.paused || state.is_finished() {
        return;
    }

    state.time_ticks += 1;
    state.clock_ms += dt as f64 * 1000.0;
    state.stats.elapsed_ms = state.clock_ms;

    // AI reads the state left by the previous tick
    let ai_intent = ai::decide(state);
    let intents = [
        input.player_one.intent(),
        ControlSource::Scripted(ai_intent).intent(),
    ];

    let gravity = state.profile.gravity();
    let court = state.court;
    for (player, intent) in state.players.iter_mut().zip(intents) {
        player.apply_intent(&intent);
        player.step_physics(gravity, &court, dt);
    }
    ai::monitor_serve(state);
    state.enforce_court_bounds();

    let ball_gravity = state.profile.ball_gravity();
    let cap = state.profile.max_ball_speed;
    let contacts: Vec<Contacts> = state
        .balls
        .iter_mut()
        .map(|ball| ball.update(ball_gravity, cap, &court, dt))
        .collect();
    state.resolve_ball_contacts(&contacts);
    state.update_power_up();

    state.apply_transitions();
    state.run_timers();
}
