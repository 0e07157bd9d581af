//! Ballsy Balls - a two-player arcade volleyball match simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, serve/score rules, AI, power-ups)
//! - `settings`: Runtime configuration for the headless runner

pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, AI counters are measured in these ticks)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Milliseconds per fixed tick
    pub const TICK_MS: f64 = 1000.0 / 60.0;

    /// World dimensions (pixels, y grows downward)
    pub const WIDTH: f32 = 1920.0;
    pub const HEIGHT: f32 = 1080.0;
    /// Top surface of the ground plane
    pub const GROUND_Y: f32 = 960.0;
    /// Court center, where the net stands
    pub const NET_X: f32 = WIDTH / 2.0;

    /// Visual net width (used for the court boundary clamp)
    pub const NET_WIDTH: f32 = 160.0;
    /// Width of the solid net body and of the player barrier above it
    pub const NET_BODY_WIDTH: f32 = 40.0;
    /// Base net height, scaled per level
    pub const NET_HEIGHT: f32 = 440.0;
    /// Fraction of the net height that is solid
    pub const NET_BODY_HEIGHT_FRAC: f32 = 0.95;
    /// Height of the invisible player barrier that starts at the net top
    pub const BARRIER_HEIGHT: f32 = 1000.0;
    /// Barrier overlap with the net top
    pub const BARRIER_OVERLAP: f32 = 20.0;

    /// Base gravity (players get the full value, balls half)
    pub const GRAVITY: f32 = 2800.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 1000.0;
    pub const PLAYER_JUMP: f32 = -1400.0;
    pub const DOUBLE_JUMP_FACTOR: f32 = 1.15;
    pub const PLAYER_DIVE_SPEED: f32 = 1400.0;
    pub const PLAYER_DRAG_X: f32 = 4000.0;
    /// Sprite bounds; the collider is 60% x 80% of these
    pub const PLAYER_SPRITE_WIDTH: f32 = 200.0;
    pub const PLAYER_SPRITE_HEIGHT: f32 = 220.0;
    /// Players never stand closer than this to the outer walls
    pub const PLAYER_WALL_MARGIN: f32 = 80.0;
    /// Lowest allowed player center
    pub const PLAYER_MAX_Y: f32 = GROUND_Y - 50.0;
    /// Extra gap kept between a player collider and the net
    pub const NET_SAFETY_MARGIN: f32 = 5.0;

    /// Power meter
    pub const POWER_MAX: f32 = 100.0;
    pub const POWER_CHARGE_RATE: f32 = 0.5;
    pub const POWER_DECAY_RATE: f32 = 0.2;
    pub const POWER_SPEND_MIN: f32 = 50.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 34.0;
    pub const BALL_BOUNCE: f32 = 0.85;
    /// Maximum ball speed after any resolution step
    pub const BALL_MAX_SPEED: f32 = 1500.0;
    /// Ticks before the same ball can register another player hit
    pub const BALL_HIT_COOLDOWN: u32 = 6;

    /// Score needed to win a match
    pub const MAX_SCORE: u8 = 15;

    /// Power-up timing (milliseconds of simulation time)
    pub const POWERUP_FIRST_SPAWN_MS: f64 = 5000.0;
    pub const POWERUP_RADIUS: f32 = 30.0;
    pub const POWERUP_RESPAWN_AFTER_EXPIRY_MS: f64 = 2000.0;
    /// AI gives up waiting for a contact serve after this long
    pub const AI_SERVE_TIMEOUT_MS: f64 = 3000.0;
    pub const EFFECT_DURATION_MS: f64 = 10_000.0;
    pub const SLOW_MULTIPLIER: f32 = 0.5;
    pub const EXTRA_BALL_COUNT: usize = 2;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
