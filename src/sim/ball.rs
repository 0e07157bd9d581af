//! Ball entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Contacts, Court, clamp_speed, step_ball_body};
use crate::consts::*;

/// A ball in play: the primary ball or a multiball extra
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees per second, visual only
    pub angular_vel: f32,
    /// Radians, visual only
    pub rotation: f32,
    pub radius: f32,
    /// Off while the ball hangs waiting for a serve
    pub gravity_enabled: bool,
    /// Level ball-speed scale applied to every strike
    pub speed_multiplier: f32,
    /// Multiball extra (removed on floor contact instead of scoring)
    pub extra: bool,
    /// Ticks before a player can strike this ball again
    #[serde(default)]
    pub hit_cooldown: u32,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, radius: f32, speed_multiplier: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            rotation: 0.0,
            radius,
            gravity_enabled: false,
            speed_multiplier,
            extra: false,
            hit_cooldown: 0,
        }
    }

    /// Park the ball at a serve position: motionless, weightless
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.gravity_enabled = false;
        self.hit_cooldown = 0;
    }

    /// Launch high and forward toward `direction` (+1 right, -1 left)
    pub fn serve(&mut self, direction: f32) {
        self.gravity_enabled = true;
        self.vel = Vec2::new(direction * 600.0, -1100.0);
        self.angular_vel = direction * 360.0;
    }

    /// Integrate one step and clamp speed
    pub fn update(&mut self, gravity: f32, max_speed: f32, court: &Court, dt: f32) -> Contacts {
        if self.hit_cooldown > 0 {
            self.hit_cooldown -= 1;
        }

        let gravity = self.gravity_enabled.then_some(gravity);
        let contacts = step_ball_body(&mut self.pos, &mut self.vel, self.radius, gravity, court, dt);
        self.vel = clamp_speed(self.vel, max_speed);

        // Spin from angular velocity plus a roll term from horizontal travel
        self.rotation += self.angular_vel.to_radians() * dt + self.vel.x * 0.0005;
        contacts
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn can_be_struck(&self) -> bool {
        self.hit_cooldown == 0
    }

    pub fn mark_struck(&mut self) {
        self.hit_cooldown = BALL_HIT_COOLDOWN;
    }
}
