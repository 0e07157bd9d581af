//! Read-only view of a match for presentation layers
//!
//! HUD and renderers read this instead of reaching into `MatchState`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::powerup::{EffectKind, PowerUpKind};
use super::state::{GameEvent, MatchPhase, MatchState, Side};
use super::stats::MatchStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub facing_left: bool,
    pub is_diving: bool,
    pub grounded: bool,
    /// 0..=100
    pub power_meter: f32,
    pub effect: EffectKind,
    pub effect_remaining_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub pos: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub extra: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub rotation: f32,
}

/// Everything a HUD needs after one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    pub is_serving: bool,
    pub score: [u8; 2],
    pub serving_side: Side,
    pub clock_ms: f64,
    pub paused: bool,
    pub players: [PlayerView; 2],
    pub balls: Vec<BallView>,
    pub multiball_active: bool,
    pub power_up: Option<PowerUpView>,
    pub stats: MatchStats,
    pub events: Vec<GameEvent>,
}

impl MatchSnapshot {
    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }
}

impl MatchState {
    pub fn snapshot(&self) -> MatchSnapshot {
        let now = self.now_ms();
        let player_view = |side: Side| {
            let player = self.player(side);
            let effect = self.effect(side);
            PlayerView {
                pos: player.pos,
                facing_left: player.facing_left,
                is_diving: player.is_diving,
                grounded: player.grounded,
                power_meter: player.power_meter,
                effect: effect.kind,
                effect_remaining_ms: effect.remaining_ms(now),
            }
        };

        MatchSnapshot {
            phase: self.phase,
            is_serving: self.is_serving(),
            score: self.score,
            serving_side: self.serving_side,
            clock_ms: now,
            paused: self.paused,
            players: [player_view(Side::One), player_view(Side::Two)],
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    pos: b.pos,
                    rotation: b.rotation,
                    radius: b.radius,
                    extra: b.extra,
                })
                .collect(),
            multiball_active: self.multiball_active,
            power_up: self.power_up.as_ref().map(|p| PowerUpView {
                kind: p.kind,
                pos: p.pos,
                rotation: p.rotation,
            }),
            stats: self.stats.clone(),
            events: self.events.clone(),
        }
    }
}
