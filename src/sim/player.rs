//! Player entity
//!
//! Horizontal running, an edge-triggered jump with one extra jump in the air, a
//! committed dive, and a power meter that charges while standing still.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::ControlIntent;
use super::physics::{Aabb, Contacts, Court, step_player_body};
use super::state::Side;
use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collider half extents
    pub half: Vec2,
    /// Standing on something after the last physics step
    pub grounded: bool,
    pub is_diving: bool,
    pub can_double_jump: bool,
    pub has_double_jumped: bool,
    /// Jump intent from the previous tick (jumps fire on the press edge)
    pub jump_was_pressed: bool,
    pub facing_left: bool,
    pub power_meter: f32,
    /// 1.0 normally, lowered by the Slow effect
    pub speed_multiplier: f32,
}

impl Player {
    pub fn new(side: Side, pos: Vec2, half: Vec2) -> Self {
        Self {
            side,
            pos,
            vel: Vec2::ZERO,
            half,
            grounded: false,
            is_diving: false,
            can_double_jump: false,
            has_double_jumped: false,
            jump_was_pressed: false,
            facing_left: side == Side::Two,
            power_meter: 0.0,
            speed_multiplier: 1.0,
        }
    }

    pub fn collider(&self) -> Aabb {
        Aabb::new(self.pos, self.half)
    }

    /// Move back to a spawn point, keeping meter and effects
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.is_diving = false;
    }

    /// Turn this tick's intent into velocity changes
    pub fn apply_intent(&mut self, intent: &ControlIntent) {
        if self.is_diving {
            // Dives are committed until touchdown
            if self.grounded {
                self.is_diving = false;
            }
            self.decay_power();
            return;
        }

        let speed = PLAYER_SPEED * self.speed_multiplier;
        if intent.left {
            self.vel.x = -speed;
            self.facing_left = true;
        } else if intent.right {
            self.vel.x = speed;
            self.facing_left = false;
        } else {
            self.vel.x = 0.0;
        }

        if self.grounded {
            self.can_double_jump = false;
            self.has_double_jumped = false;
        }

        if intent.up && !self.jump_was_pressed {
            if self.grounded {
                self.vel.y = PLAYER_JUMP;
                self.can_double_jump = true;
            } else if self.can_double_jump && !self.has_double_jumped {
                self.vel.y = PLAYER_JUMP * DOUBLE_JUMP_FACTOR;
                self.has_double_jumped = true;
                self.can_double_jump = false;
            }
        }
        self.jump_was_pressed = intent.up;

        if intent.down && !self.grounded {
            self.start_dive(intent);
        }

        if self.grounded && self.vel.x == 0.0 {
            self.power_meter = (self.power_meter + POWER_CHARGE_RATE).min(POWER_MAX);
        } else {
            self.decay_power();
        }
    }

    fn start_dive(&mut self, intent: &ControlIntent) {
        self.is_diving = true;
        let dir = if intent.right {
            1.0
        } else if intent.left {
            -1.0
        } else if self.facing_left {
            -1.0
        } else {
            1.0
        };
        self.vel.x = dir * PLAYER_DIVE_SPEED;
        self.vel.y = PLAYER_DIVE_SPEED / 2.0;
    }

    fn decay_power(&mut self) {
        self.power_meter = (self.power_meter - POWER_DECAY_RATE).max(0.0);
    }

    /// Integrate against the court and refresh `grounded`
    pub fn step_physics(&mut self, gravity: f32, court: &Court, dt: f32) -> Contacts {
        let contacts = step_player_body(
            &mut self.pos,
            &mut self.vel,
            self.half,
            gravity,
            PLAYER_DRAG_X,
            court,
            dt,
        );
        self.grounded = contacts.blocked_down;
        contacts
    }

    /// Spend the meter if at least half full
    pub fn use_power(&mut self) -> f32 {
        if self.power_meter >= POWER_SPEND_MIN {
            let power = self.power_meter;
            self.power_meter = 0.0;
            power
        } else {
            0.0
        }
    }
}
