//! Physics integrator
//!
//! Per-entity gravity, drag and velocity integration plus the response against
//! the static court: ground, net body, the invisible player barrier above the
//! net, and the world bounds. Players are axis-aligned boxes, balls are circles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{aabb_aabb_collision, circle_aabb_collision, reflect_with_bounce};
use super::level::LevelProfile;
use crate::consts::*;

/// Axis-aligned box stored as center + half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Build from min/max corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            half: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }
}

/// Contacts a body reported during its last integration step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    /// Resting on something below (ground, net top or the world floor)
    pub blocked_down: bool,
    /// Ball struck the net body this step
    pub net: bool,
    /// Ball touched the ground plane this step
    pub ground: bool,
}

/// Static geometry of the court for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub ground: Aabb,
    /// Solid net body (players and balls)
    pub net: Aabb,
    /// Tall invisible wall above the net (players only)
    pub barrier: Aabb,
    pub net_top: f32,
    pub bounds: Aabb,
}

impl Court {
    pub fn new(profile: &LevelProfile) -> Self {
        let net_top = profile.net_top();
        let net_body_height = profile.net_height * NET_BODY_HEIGHT_FRAC;
        let half_body = NET_BODY_WIDTH / 2.0;
        Self {
            ground: Aabb::from_min_max(Vec2::new(0.0, GROUND_Y), Vec2::new(WIDTH, GROUND_Y + 100.0)),
            net: Aabb::from_min_max(
                Vec2::new(NET_X - half_body, GROUND_Y - net_body_height),
                Vec2::new(NET_X + half_body, GROUND_Y),
            ),
            barrier: Aabb::from_min_max(
                Vec2::new(NET_X - half_body, net_top - BARRIER_HEIGHT + BARRIER_OVERLAP),
                Vec2::new(NET_X + half_body, net_top + BARRIER_OVERLAP),
            ),
            net_top,
            bounds: Aabb::from_min_max(Vec2::ZERO, Vec2::new(WIDTH, HEIGHT)),
        }
    }

    /// Furthest x player 1 may reach toward the net
    pub fn left_limit(&self, player_half_width: f32) -> f32 {
        NET_X - NET_WIDTH / 2.0 - player_half_width - NET_SAFETY_MARGIN
    }

    /// Furthest x player 2 may reach toward the net
    pub fn right_limit(&self, player_half_width: f32) -> f32 {
        NET_X + NET_WIDTH / 2.0 + player_half_width + NET_SAFETY_MARGIN
    }
}

/// Horizontal drag toward zero, never overshooting
#[inline]
pub fn apply_drag(vx: f32, drag: f32, dt: f32) -> f32 {
    let step = drag * dt;
    if vx.abs() <= step { 0.0 } else { vx - step * vx.signum() }
}

/// Scale a velocity down to `cap` while keeping its direction
#[inline]
pub fn clamp_speed(vel: Vec2, cap: f32) -> Vec2 {
    let speed = vel.length();
    if speed > cap && speed > 0.0 {
        vel * (cap / speed)
    } else {
        vel
    }
}

/// Integrate a player box: gravity, drag, movement and static collisions
pub fn step_player_body(
    pos: &mut Vec2,
    vel: &mut Vec2,
    half: Vec2,
    gravity: f32,
    drag: f32,
    court: &Court,
    dt: f32,
) -> Contacts {
    vel.y += gravity * dt;
    vel.x = apply_drag(vel.x, drag, dt);
    *pos += *vel * dt;

    let mut contacts = Contacts::default();
    for solid in [&court.ground, &court.net, &court.barrier] {
        let result = aabb_aabb_collision(&Aabb::new(*pos, half), solid);
        if !result.hit {
            continue;
        }
        *pos += result.normal * result.penetration;
        if result.normal.y < 0.0 {
            // Landed on top
            contacts.blocked_down = true;
            vel.y = vel.y.min(0.0);
        } else if result.normal.y > 0.0 {
            vel.y = vel.y.max(0.0);
        } else if vel.x * result.normal.x < 0.0 {
            vel.x = 0.0;
        }
    }

    // World bounds
    let min = court.bounds.min() + half;
    let max = court.bounds.max() - half;
    if pos.x < min.x {
        pos.x = min.x;
        vel.x = vel.x.max(0.0);
    } else if pos.x > max.x {
        pos.x = max.x;
        vel.x = vel.x.min(0.0);
    }
    if pos.y < min.y {
        pos.y = min.y;
        vel.y = vel.y.max(0.0);
    } else if pos.y >= max.y {
        pos.y = max.y;
        vel.y = vel.y.min(0.0);
        contacts.blocked_down = true;
    }

    contacts
}

/// Integrate a ball circle: optional gravity, movement, bounds/net bounce and
/// ground contact detection
pub fn step_ball_body(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    gravity: Option<f32>,
    court: &Court,
    dt: f32,
) -> Contacts {
    if let Some(g) = gravity {
        vel.y += g * dt;
    }
    *pos += *vel * dt;

    let mut contacts = Contacts::default();

    // World bounds bounce
    let min = court.bounds.min() + Vec2::splat(radius);
    let max = court.bounds.max() - Vec2::splat(radius);
    if pos.x < min.x {
        pos.x = min.x;
        vel.x = vel.x.abs() * BALL_BOUNCE;
    } else if pos.x > max.x {
        pos.x = max.x;
        vel.x = -vel.x.abs() * BALL_BOUNCE;
    }
    if pos.y < min.y {
        pos.y = min.y;
        vel.y = vel.y.abs() * BALL_BOUNCE;
    } else if pos.y > max.y {
        pos.y = max.y;
        vel.y = -vel.y.abs() * BALL_BOUNCE;
    }

    // Net body
    let net = circle_aabb_collision(*pos, radius, &court.net);
    if net.hit {
        *pos += net.normal * net.penetration;
        if vel.dot(net.normal) < 0.0 {
            *vel = reflect_with_bounce(*vel, net.normal, BALL_BOUNCE);
            contacts.net = true;
        }
    }

    // Ground plane
    if pos.y + radius >= court.ground.top() {
        pos.y = court.ground.top() - radius;
        if vel.y > 0.0 {
            vel.y = -vel.y * BALL_BOUNCE;
        }
        contacts.ground = true;
        contacts.blocked_down = true;
    }

    contacts
}
