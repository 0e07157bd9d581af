//! Match state and core simulation types
//!
//! `MatchState` is the simulation context: every update receives it explicitly
//! instead of reaching for a global scene.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::AiState;
use super::ball::Ball;
use super::level::{LevelKind, LevelProfile};
use super::physics::Court;
use super::player::Player;
use super::powerup::{PowerUp, PowerUpEffect, PowerUpKind};
use super::schedule::{Scheduler, TimerAction};
use super::stats::MatchStats;
use crate::consts::*;

/// One of the two competitors. Side one plays the left court, side two (the AI) the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Whose court contains `x`
    pub fn court_of(x: f32) -> Side {
        if x < NET_X { Side::One } else { Side::Two }
    }

    /// Where the ball hangs when this side serves
    pub fn serve_position(self) -> Vec2 {
        match self {
            Side::One => Vec2::new(WIDTH * 0.2, HEIGHT * 0.5),
            Side::Two => Vec2::new(WIDTH * 0.8, HEIGHT * 0.5),
        }
    }

    /// Match-start player position
    pub fn start_position(self) -> Vec2 {
        match self {
            Side::One => Vec2::new(WIDTH * 0.25, GROUND_Y - 100.0),
            Side::Two => Vec2::new(WIDTH * 0.75, GROUND_Y - 100.0),
        }
    }

    /// Horizontal direction toward the opponent's court
    pub fn forward(self) -> f32 {
        match self {
            Side::One => 1.0,
            Side::Two => -1.0,
        }
    }
}

/// Serve/score state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Ball hangs over `side`'s court until someone strikes it
    Serving { side: Side },
    Rallying,
    /// Primary ball hit the ground this tick; resolved before the tick ends
    PointScored { scorer: Side },
    GameOver { winner: Side },
    /// Torn down by `shutdown`
    Stopped,
}

/// One-shot feedback events, cleared at the start of every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerHit(Side),
    NetHit,
    /// Ball landed; carries the side that won the point
    FloorScored(Side),
    PowerUpSpawned(PowerUpKind),
    PowerUpCollected { kind: PowerUpKind, collector: Side },
    PowerUpExpired,
    EffectExpired(Side),
    MultiballActivated,
    ExtraBallRemoved,
    MultiballEnded,
    /// AI serve timed out and the ball was launched for it
    AutoServe,
    Paused(bool),
    GameOver(Side),
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Match seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    pub profile: LevelProfile,
    pub court: Court,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock in milliseconds
    pub clock_ms: f64,
    pub phase: MatchPhase,
    pub serving_side: Side,
    pub score: [u8; 2],
    pub last_hitter: Option<Side>,
    pub paused: bool,
    pub players: [Player; 2],
    /// `balls[0]` is the primary ball, the rest are multiball extras
    pub balls: Vec<Ball>,
    pub multiball_active: bool,
    pub power_up: Option<PowerUp>,
    pub effects: [PowerUpEffect; 2],
    pub ai: AiState,
    pub stats: MatchStats,
    pub scheduler: Scheduler,
    /// Events produced by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl MatchState {
    /// Start a match on the given level
    pub fn start_match(level: LevelKind, seed: u64) -> Self {
        Self::with_profile(LevelProfile::for_level(level), seed)
    }

    pub fn with_profile(profile: LevelProfile, seed: u64) -> Self {
        let (half_w, half_h) = profile.player_half_extents();
        let half = Vec2::new(half_w, half_h);
        let players = [
            Player::new(Side::One, Side::One.start_position(), half),
            Player::new(Side::Two, Side::Two.start_position(), half),
        ];

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            profile,
            court: Court::new(&profile),
            time_ticks: 0,
            clock_ms: 0.0,
            phase: MatchPhase::Serving { side: Side::One },
            serving_side: Side::One,
            score: [0, 0],
            last_hitter: Some(Side::One),
            paused: false,
            ai: AiState::new(players[1].pos.x),
            players,
            balls: Vec::new(),
            multiball_active: false,
            power_up: None,
            effects: [PowerUpEffect::default(), PowerUpEffect::default()],
            stats: MatchStats::default(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            next_id: 1,
        };

        let id = state.next_entity_id();
        state.balls.push(Ball::new(
            id,
            Side::One.serve_position(),
            profile.ball_radius,
            profile.ball_speed_scale,
        ));
        state
            .scheduler
            .schedule(POWERUP_FIRST_SPAWN_MS, TimerAction::SpawnPowerUp);

        log::info!(
            "Match started on {} (seed {}), first to {}",
            profile.kind.as_str(),
            seed,
            MAX_SCORE
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn is_serving(&self) -> bool {
        matches!(self.phase, MatchPhase::Serving { .. })
    }

    /// True once the match can no longer advance
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MatchPhase::GameOver { .. } | MatchPhase::Stopped)
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            MatchPhase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn player_mut(&mut self, side: Side) -> &mut Player {
        &mut self.players[side.index()]
    }

    pub fn score_of(&self, side: Side) -> u8 {
        self.score[side.index()]
    }

    pub fn primary_ball(&self) -> &Ball {
        &self.balls[0]
    }

    pub fn primary_ball_mut(&mut self) -> &mut Ball {
        &mut self.balls[0]
    }

    pub fn ball_index(&self, id: u32) -> Option<usize> {
        self.balls.iter().position(|b| b.id == id)
    }

    pub fn extra_ball_count(&self) -> usize {
        self.balls.iter().filter(|b| b.extra).count()
    }

    pub fn effect(&self, side: Side) -> &PowerUpEffect {
        &self.effects[side.index()]
    }
}
