//! Level presets
//!
//! A match picks one of three presets at start. Everything that differs between
//! levels (physics scaling, collider sizes, AI thresholds) lives here as data.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The three built-in courts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelKind {
    #[default]
    Beach,
    Lava,
    Hell,
}

impl LevelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelKind::Beach => "Beach",
            LevelKind::Lava => "Lava",
            LevelKind::Hell => "Hell",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beach" => Some(LevelKind::Beach),
            "lava" => Some(LevelKind::Lava),
            "hell" | "winter" | "freeze" => Some(LevelKind::Hell),
            _ => None,
        }
    }
}

/// Last-resort dive used by the top AI tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesperateSave {
    /// Horizontal reach of the emergency dive
    pub range: f32,
    /// Ball must be falling faster than this
    pub min_fall_speed: f32,
    /// Ball must be below this fraction of the screen height
    pub low_frac: f32,
}

/// AI thresholds for one difficulty tier
///
/// Most values derive from the skill multiplier; the top tier overrides them with
/// hand-tuned constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiTuning {
    pub skill: f32,
    /// Solve the projectile equation for the lead time instead of a fixed factor
    pub analytic_prediction: bool,
    /// Extra lead applied when the ball is already falling on our side
    pub falling_lead: f32,
    /// Resting x (fraction of width) while the ball is on the other side
    pub defensive_x_frac: f32,
    pub move_threshold: f32,
    /// Reach within which a jump is allowed even when the ball is not in front
    pub jump_reach: f32,
    pub jump_distance: f32,
    pub jump_vertical_min: f32,
    pub jump_vertical_max: f32,
    /// Jump even when the ball is behind the player
    pub jump_when_behind: bool,
    /// Milliseconds after a jump before a dive may start
    pub dive_cooldown_ms: f64,
    pub dive_min_distance: f32,
    pub dive_max_distance: f32,
    pub dive_vertical: f32,
    pub desperate_save: Option<DesperateSave>,
    /// Random spread around the aim point when the AI strikes the ball
    pub hit_spread: f32,
    /// How strongly the AI bends its hit toward the aim point
    pub aim_influence: f32,
    /// Chance of aiming for a corner instead
    pub corner_aim_chance: f64,
    pub corner_influence: f32,
    /// Vertical impulse of an AI hit (taller nets need more)
    pub hit_lift: f32,
}

impl AiTuning {
    /// Thresholds derived purely from the skill multiplier
    pub fn scaled(skill: f32) -> Self {
        Self {
            skill,
            analytic_prediction: false,
            falling_lead: 1.0,
            defensive_x_frac: 0.75,
            move_threshold: 50.0 / skill,
            jump_reach: 120.0 * skill,
            jump_distance: 200.0 * skill,
            jump_vertical_min: 50.0 / skill,
            jump_vertical_max: 600.0,
            jump_when_behind: false,
            dive_cooldown_ms: 200.0 / skill as f64,
            dive_min_distance: 100.0 / skill,
            dive_max_distance: 350.0 * skill,
            dive_vertical: 120.0 * skill,
            desperate_save: None,
            hit_spread: 600.0,
            aim_influence: 0.8,
            corner_aim_chance: 0.0,
            corner_influence: 2.0,
            hit_lift: -1200.0,
        }
    }
}

/// Physics and AI parameters for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProfile {
    pub kind: LevelKind,
    pub gravity_scale: f32,
    pub ball_speed_scale: f32,
    pub net_height: f32,
    pub ball_radius: f32,
    /// Sprite scale relative to the Beach sprites
    pub player_scale: f32,
    pub max_ball_speed: f32,
    pub ai: AiTuning,
}

impl LevelProfile {
    pub fn for_level(kind: LevelKind) -> Self {
        match kind {
            LevelKind::Beach => Self {
                kind,
                gravity_scale: 1.0,
                ball_speed_scale: 1.0,
                net_height: NET_HEIGHT,
                ball_radius: BALL_RADIUS,
                player_scale: 1.0,
                max_ball_speed: BALL_MAX_SPEED,
                ai: AiTuning::scaled(1.125),
            },
            LevelKind::Lava => Self {
                kind,
                gravity_scale: 1.15,
                ball_speed_scale: 1.2,
                net_height: NET_HEIGHT * 1.3,
                ball_radius: BALL_RADIUS * 0.89,
                player_scale: 1.0,
                max_ball_speed: BALL_MAX_SPEED,
                ai: AiTuning {
                    hit_lift: -1350.0,
                    ..AiTuning::scaled(1.35)
                },
            },
            LevelKind::Hell => Self {
                kind,
                gravity_scale: 1.25,
                ball_speed_scale: 1.944,
                net_height: NET_HEIGHT * 1.15,
                ball_radius: BALL_RADIUS * 0.9,
                player_scale: 0.9,
                max_ball_speed: BALL_MAX_SPEED,
                ai: AiTuning {
                    analytic_prediction: true,
                    falling_lead: 1.2,
                    defensive_x_frac: 0.7,
                    move_threshold: 5.0,
                    jump_distance: 600.0,
                    jump_vertical_min: 10.0,
                    jump_vertical_max: 900.0,
                    jump_when_behind: true,
                    dive_min_distance: 20.0,
                    dive_max_distance: 720.0,
                    dive_vertical: 240.0,
                    desperate_save: Some(DesperateSave {
                        range: 840.0,
                        min_fall_speed: 300.0,
                        low_frac: 0.6,
                    }),
                    hit_spread: 20.0,
                    aim_influence: 4.0,
                    corner_aim_chance: 0.5,
                    hit_lift: -1500.0,
                    ..AiTuning::scaled(10.0)
                },
            },
        }
    }

    /// Player gravity
    pub fn gravity(&self) -> f32 {
        GRAVITY * self.gravity_scale
    }

    /// Ball gravity (balls fall at half the player rate)
    pub fn ball_gravity(&self) -> f32 {
        self.gravity() / 2.0
    }

    /// Top edge of the net
    pub fn net_top(&self) -> f32 {
        GROUND_Y - self.net_height
    }

    /// Player collider half extents (60% x 80% of the sprite)
    pub fn player_half_extents(&self) -> (f32, f32) {
        (
            PLAYER_SPRITE_WIDTH * 0.6 * self.player_scale / 2.0,
            PLAYER_SPRITE_HEIGHT * 0.8 * self.player_scale / 2.0,
        )
    }
}

impl Default for LevelProfile {
    fn default() -> Self {
        Self::for_level(LevelKind::Beach)
    }
}
