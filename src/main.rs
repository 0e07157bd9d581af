//! Ballsy Balls headless runner
//!
//! Plays one match on the fixed timestep: the built-in AI on the right against a
//! simple scripted chaser on the left, then prints the final snapshot as JSON.
//!
//! Usage: `ballsy-balls [settings.json]`

use std::path::Path;

use ballsy_balls::Settings;
use ballsy_balls::consts::*;
use ballsy_balls::sim::{ControlSource, KeyboardState, MatchState, Side, TickInput, tick};

/// Keys for the left player: get under the ball and jump when it drops close
fn chase_keys(state: &MatchState) -> KeyboardState {
    let player = state.player(Side::One);
    let ball = state.primary_ball();
    let aim_x = ball.pos.x - 20.0;
    let on_our_side = ball.pos.x < NET_X;
    let dx = aim_x - player.pos.x;

    KeyboardState {
        left: on_our_side && dx < -15.0,
        right: on_our_side && dx > 15.0,
        up: player.grounded && on_our_side && dx.abs() < 80.0 && player.pos.y - ball.pos.y < 450.0,
        down: false,
    }
}

fn main() {
    env_logger::init();
    log::info!("Ballsy Balls (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = settings.resolve_seed();
    let mut state = MatchState::start_match(settings.level, seed);

    let max_ticks = (settings.max_match_seconds as f64 * 1000.0 / TICK_MS) as u64;
    while !state.is_finished() && state.time_ticks < max_ticks {
        let input = TickInput {
            player_one: ControlSource::Keyboard(chase_keys(&state)),
            pause: false,
        };
        tick(&mut state, &input, SIM_DT);
    }

    match state.winner() {
        Some(side) => log::info!("Player {} won", side.number()),
        None => log::info!("Time limit reached at {} - {}", state.score[0], state.score[1]),
    }
    let snapshot = state.snapshot();
    state.shutdown();

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize snapshot: {}", e),
    }
}
