//! Collision detection and response
//!
//! Shape tests for the two collider kinds in the match (player boxes and ball
//! circles) plus the ball-player strike rule, which is what gives players
//! directional control over their hits.

use glam::Vec2;

use super::physics::Aabb;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Separation direction for the moving shape
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against a box
///
/// The normal points from the box toward the circle center. A center that sits
/// inside the box is pushed out along the axis of least penetration.
pub fn circle_aabb_collision(center: Vec2, radius: f32, aabb: &Aabb) -> CollisionResult {
    let closest = center.clamp(aabb.min(), aabb.max());
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Center inside the box
    let local = center - aabb.center;
    let gap = aabb.half - local.abs();
    let (normal, depth) = if gap.x < gap.y {
        (Vec2::new(local.x.signum(), 0.0), gap.x)
    } else {
        (Vec2::new(0.0, local.y.signum()), gap.y)
    };
    CollisionResult {
        hit: true,
        normal,
        penetration: depth + radius,
    }
}

/// Check box `a` against box `b`
///
/// The normal points from `b` toward `a`, so `a.center + normal * penetration`
/// separates them.
pub fn aabb_aabb_collision(a: &Aabb, b: &Aabb) -> CollisionResult {
    let delta = a.center - b.center;
    let overlap = a.half + b.half - delta.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return CollisionResult::miss();
    }

    let (normal, penetration) = if overlap.x < overlap.y {
        let dir = if delta.x < 0.0 { -1.0 } else { 1.0 };
        (Vec2::new(dir, 0.0), overlap.x)
    } else {
        let dir = if delta.y < 0.0 { -1.0 } else { 1.0 };
        (Vec2::new(0.0, dir), overlap.y)
    };

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Overlap test between two circles (no response)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Reflect velocity off a surface, with restitution on the normal component
///
/// v' = v - (1 + e)(v·n)n
#[inline]
pub fn reflect_with_bounce(velocity: Vec2, normal: Vec2, bounce: f32) -> Vec2 {
    velocity - (1.0 + bounce) * velocity.dot(normal) * normal
}

/// Horizontal velocity after a player strikes the ball
///
/// Half the incoming ball momentum, a strong push from where on the body the
/// ball landed, and half the player's own run speed.
#[inline]
pub fn strike_velocity_x(ball_vel_x: f32, ball_x: f32, player_x: f32, player_vel_x: f32) -> f32 {
    ball_vel_x * 0.5 + (ball_x - player_x) * 20.0 + player_vel_x * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(50.0, 50.0))
    }

    #[test]
    fn test_circle_aabb_side_hit() {
        let result = circle_aabb_collision(Vec2::new(60.0, 0.0), 20.0, &unit_box());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::new(1.0, 0.0));
        assert!((result.penetration - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_aabb_corner_miss() {
        // Outside the corner diagonal even though both axes overlap the expanded box
        let result = circle_aabb_collision(Vec2::new(65.0, 65.0), 20.0, &unit_box());
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_inside_box_pushes_along_shallow_axis() {
        let result = circle_aabb_collision(Vec2::new(0.0, -45.0), 10.0, &unit_box());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::new(0.0, -1.0));
        assert!((result.penetration - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_aabb_overlap_normal_points_to_a() {
        let a = Aabb::new(Vec2::new(0.0, -95.0), Vec2::new(50.0, 50.0));
        let result = aabb_aabb_collision(&a, &unit_box());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::new(0.0, -1.0));
        assert!((result.penetration - 5.0).abs() < 1e-4);

        let far = Aabb::new(Vec2::new(200.0, 0.0), Vec2::new(50.0, 50.0));
        assert!(!aabb_aabb_collision(&far, &unit_box()).hit);
    }

    #[test]
    fn test_reflect_with_bounce() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_with_bounce(Vec2::new(100.0, 20.0), Vec2::new(-1.0, 0.0), 0.85);
        assert!((reflected.x - (-85.0)).abs() < 0.001);
        assert!((reflected.y - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_strike_uses_hit_offset() {
        // Ball struck on the player's right half flies right even when falling straight
        assert_eq!(strike_velocity_x(0.0, 110.0, 100.0, 0.0), 200.0);
        // Incoming momentum and run speed are halved
        assert_eq!(strike_velocity_x(-400.0, 100.0, 100.0, 600.0), 100.0);
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 30.0, Vec2::new(50.0, 0.0), 30.0));
        assert!(!circles_overlap(Vec2::ZERO, 30.0, Vec2::new(61.0, 0.0), 30.0));
    }
}
