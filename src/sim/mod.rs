//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Delayed work runs on the simulation clock through the scheduler
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod ball;
pub mod collision;
pub mod input;
pub mod level;
pub mod physics;
pub mod player;
pub mod powerup;
pub mod rules;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod tick;

pub use ball::Ball;
pub use collision::{CollisionResult, circle_aabb_collision, strike_velocity_x};
pub use input::{ControlIntent, ControlSource, IntentSource, KeyboardState, TouchState};
pub use level::{AiTuning, LevelKind, LevelProfile};
pub use physics::{Aabb, Contacts, Court};
pub use player::Player;
pub use powerup::{EffectKind, PowerUp, PowerUpEffect, PowerUpKind};
pub use schedule::{Scheduler, TimerAction, TimerToken};
pub use snapshot::MatchSnapshot;
pub use state::{GameEvent, MatchPhase, MatchState, Side};
pub use stats::MatchStats;
pub use tick::{TickInput, tick};
