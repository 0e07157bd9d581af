//! Power-ups: spawning, collection, the Slow effect and multiball
//!
//! Every delayed transition goes through the scheduler and the owning state
//! keeps the token, so a torn-down effect can never be cleared twice or late.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::schedule::{TimerAction, TimerToken};
use super::state::{GameEvent, MatchState, Side};
use crate::consts::*;

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Halves the opponent's run speed for a while
    Slow,
    /// Splits the primary ball into three
    Multiball,
}

impl PowerUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Slow => "slow",
            PowerUpKind::Multiball => "multiball",
        }
    }
}

/// A collectible floating over one of the courts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    /// Resting height the float animation bobs around
    pub start_y: f32,
    pub float_phase: f32,
    pub rotation: f32,
    pub radius: f32,
    /// Pending expiry
    pub expire_token: Option<TimerToken>,
}

impl PowerUp {
    /// Per-tick bob and spin
    pub fn animate(&mut self) {
        self.float_phase += 0.05;
        self.pos.y = self.start_y + self.float_phase.sin() * 15.0;
        self.rotation += 0.02;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    #[default]
    None,
    Slow,
}

/// Timed effect currently applied to one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpEffect {
    pub kind: EffectKind,
    pub end_ms: f64,
    pub token: Option<TimerToken>,
}

impl PowerUpEffect {
    pub fn is_active(&self) -> bool {
        self.kind != EffectKind::None
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        if self.is_active() {
            (self.end_ms - now_ms).max(0.0)
        } else {
            0.0
        }
    }
}

impl MatchState {
    /// Place a new power-up. Returns false when one is already out.
    pub fn spawn_power_up(&mut self) -> bool {
        if self.power_up.is_some() || self.is_finished() {
            return false;
        }

        let kind = if self.rng.random_bool(0.5) {
            PowerUpKind::Slow
        } else {
            PowerUpKind::Multiball
        };
        let x = if self.rng.random_bool(0.5) {
            self.rng.random_range(100.0..=350.0)
        } else {
            self.rng.random_range(WIDTH - 350.0..=WIDTH - 100.0)
        };
        let y = self.rng.random_range(200.0..=350.0);
        let float_phase = self.rng.random_range(0.0..(PI * 2.0));
        let lifetime = self.rng.random_range(15_000.0..=25_000.0);

        let now = self.now_ms();
        let expire_token = self
            .scheduler
            .schedule(now + lifetime, TimerAction::ExpirePowerUp);
        let id = self.next_entity_id();
        self.power_up = Some(PowerUp {
            id,
            kind,
            pos: Vec2::new(x, y),
            start_y: y,
            float_phase,
            rotation: 0.0,
            radius: POWERUP_RADIUS,
            expire_token: Some(expire_token),
        });

        log::debug!("Spawned {} power-up at ({:.0}, {:.0})", kind.as_str(), x, y);
        self.events.push(GameEvent::PowerUpSpawned(kind));
        true
    }

    /// Uncollected power-up timed out
    pub(crate) fn expire_power_up(&mut self) {
        if self.power_up.take().is_none() {
            return;
        }
        log::debug!("Power-up expired uncollected");
        self.events.push(GameEvent::PowerUpExpired);
        let now = self.now_ms();
        self.scheduler
            .schedule(now + POWERUP_RESPAWN_AFTER_EXPIRY_MS, TimerAction::SpawnPowerUp);
    }

    /// The primary ball touched the power-up
    ///
    /// The side that last struck the ball collects it; effects land on the
    /// opponent.
    pub fn collect_power_up(&mut self) -> bool {
        let Some(power_up) = self.power_up.take() else {
            return false;
        };
        if let Some(token) = power_up.expire_token {
            self.scheduler.cancel(token);
        }

        let collector = self.last_hitter.unwrap_or_else(|| {
            log::warn!("Power-up collected with no last hitter, crediting player 1");
            Side::One
        });
        let victim = collector.opponent();
        self.stats.record_collection(collector);
        log::info!(
            "Player {} collected {}",
            collector.number(),
            power_up.kind.as_str()
        );
        self.events.push(GameEvent::PowerUpCollected {
            kind: power_up.kind,
            collector,
        });

        match power_up.kind {
            PowerUpKind::Slow => self.apply_slow(victim),
            PowerUpKind::Multiball => {
                self.activate_multiball();
            }
        }

        let now = self.now_ms();
        let delay = self.rng.random_range(8_000.0..=15_000.0);
        self.scheduler
            .schedule(now + delay, TimerAction::SpawnPowerUp);
        true
    }

    /// Slow `victim` down, replacing any effect already on them
    pub fn apply_slow(&mut self, victim: Side) {
        let now = self.now_ms();
        if let Some(old) = self.effects[victim.index()].token.take() {
            self.scheduler.cancel(old);
        }
        let end_ms = now + EFFECT_DURATION_MS;
        let token = self
            .scheduler
            .schedule(end_ms, TimerAction::ClearEffect(victim));
        self.effects[victim.index()] = PowerUpEffect {
            kind: EffectKind::Slow,
            end_ms,
            token: Some(token),
        };
        self.player_mut(victim).speed_multiplier = SLOW_MULTIPLIER;
    }

    /// End the effect on `side`. Returns false if nothing was active.
    pub fn clear_effect(&mut self, side: Side) -> bool {
        let effect = std::mem::take(&mut self.effects[side.index()]);
        if let Some(token) = effect.token {
            self.scheduler.cancel(token);
        }
        self.player_mut(side).speed_multiplier = 1.0;
        if !effect.is_active() {
            return false;
        }
        log::debug!("Effect on player {} ended", side.number());
        self.events.push(GameEvent::EffectExpired(side));
        true
    }

    /// Spawn the extra balls. Returns false if multiball is already running.
    pub fn activate_multiball(&mut self) -> bool {
        if self.multiball_active {
            return false;
        }
        let primary = self.primary_ball().clone();
        for i in 0..EXTRA_BALL_COUNT {
            let angle = i as f32 * PI * 2.0 / EXTRA_BALL_COUNT as f32;
            let offset = Vec2::new(angle.cos() * 200.0, angle.sin() * 200.0 - 300.0);
            let id = self.next_entity_id();
            let mut ball = Ball::new(id, primary.pos, primary.radius, primary.speed_multiplier);
            ball.extra = true;
            ball.gravity_enabled = true;
            ball.vel = primary.vel + offset;
            self.balls.push(ball);
        }
        self.multiball_active = true;
        log::info!("Multiball: {} balls in play", self.balls.len());
        self.events.push(GameEvent::MultiballActivated);
        true
    }

    /// Drop an extra ball that reached the floor
    pub fn remove_extra_ball(&mut self, id: u32) -> bool {
        let Some(index) = self.ball_index(id) else {
            return false;
        };
        if !self.balls[index].extra {
            return false;
        }
        self.balls.remove(index);
        self.events.push(GameEvent::ExtraBallRemoved);
        if self.extra_ball_count() == 0 && self.multiball_active {
            self.multiball_active = false;
            log::debug!("Multiball ended");
            self.events.push(GameEvent::MultiballEnded);
        }
        true
    }

    /// Remove every extra ball at once (round reset, shutdown)
    pub fn clear_multiball(&mut self) {
        self.balls.retain(|b| !b.extra);
        self.multiball_active = false;
    }

    /// Float animation and pickup test against the primary ball
    pub(crate) fn update_power_up(&mut self) {
        let Some(power_up) = self.power_up.as_mut() else {
            return;
        };
        power_up.animate();
        let (pos, radius) = (power_up.pos, power_up.radius);

        let ball = self.primary_ball();
        if super::collision::circles_overlap(ball.pos, ball.radius, pos, radius) {
            self.collect_power_up();
        }
    }

    /// Fire every scheduled event that has come due
    pub(crate) fn run_timers(&mut self) {
        for due in self.scheduler.pop_due(self.clock_ms) {
            match due.action {
                TimerAction::SpawnPowerUp => {
                    self.spawn_power_up();
                }
                TimerAction::ExpirePowerUp => {
                    let current = self.power_up.as_ref().and_then(|p| p.expire_token);
                    if current == Some(due.token) {
                        self.expire_power_up();
                    }
                }
                TimerAction::ClearEffect(side) => {
                    if self.effects[side.index()].token == Some(due.token) {
                        self.clear_effect(side);
                    }
                }
            }
        }
    }
}
