//! Axis-aligned box overlap tests and contact resolution
//!
//! Every body in the runner is a box: the ground strip, the character and
//! the cacti. Boxes are stored as center + half extents.

use glam::Vec2;

/// Touching tolerance: boxes closer than this still count as in contact.
/// Keeps a resting character from flickering on and off the ground.
pub const CONTACT_SLOP: f32 = 0.5;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size / 2.0,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// True if the boxes overlap or are within `slop` of each other
    pub fn touches(&self, other: &Aabb, slop: f32) -> bool {
        let gap = (self.center - other.center).abs() - (self.half + other.half);
        gap.x <= slop && gap.y <= slop
    }
}

/// Result of a penetration check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the boxes interpenetrate
    pub hit: bool,
    /// Unit axis pointing from `other` toward `body` (push-out direction)
    pub normal: Vec2,
    /// Penetration depth along `normal`
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

/// Penetration of `body` into `other`, resolved along the shallower axis
pub fn aabb_penetration(body: &Aabb, other: &Aabb) -> CollisionResult {
    let delta = body.center - other.center;
    let overlap = (body.half + other.half) - delta.abs();

    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return CollisionResult::miss();
    }

    if overlap.y <= overlap.x {
        CollisionResult {
            hit: true,
            normal: Vec2::new(0.0, if delta.y >= 0.0 { 1.0 } else { -1.0 }),
            penetration: overlap.y,
        }
    } else {
        CollisionResult {
            hit: true,
            normal: Vec2::new(if delta.x >= 0.0 { 1.0 } else { -1.0 }, 0.0),
            penetration: overlap.x,
        }
    }
}

/// Remove the velocity component driving into the surface and apply
/// Coulomb friction to what is left.
///
/// `friction` is the combined coefficient of the two surfaces.
pub fn resolve_velocity(vel: Vec2, normal: Vec2, friction: f32) -> Vec2 {
    let vn = vel.dot(normal);
    if vn >= 0.0 {
        // Already separating
        return vel;
    }
    let normal_part = normal * vn;
    let tangent_part = vel - normal_part;

    let tangent_speed = tangent_part.length();
    if tangent_speed <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let reduced = (tangent_speed - friction * -vn).max(0.0);
    tangent_part * (reduced / tangent_speed)
}

/// Combined friction of two surfaces
#[inline]
pub fn mix_friction(a: f32, b: f32) -> f32 {
    (a * b).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_box_touches_within_slop() {
        let ground = Aabb::new(Vec2::new(0.0, 20.0), Vec2::new(400.0, 40.0));
        let body = Aabb::new(Vec2::new(0.0, 62.0), Vec2::new(40.0, 44.0));
        assert!(body.touches(&ground, CONTACT_SLOP));
        assert!(!aabb_penetration(&body, &ground).hit);

        let lifted = Aabb::new(Vec2::new(0.0, 70.0), Vec2::new(40.0, 44.0));
        assert!(!lifted.touches(&ground, CONTACT_SLOP));
    }

    #[test]
    fn test_penetration_pushes_up_out_of_ground() {
        let ground = Aabb::new(Vec2::new(0.0, 20.0), Vec2::new(400.0, 40.0));
        let body = Aabb::new(Vec2::new(10.0, 60.0), Vec2::new(40.0, 44.0));

        let result = aabb_penetration(&body, &ground);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_side_hit_pushes_sideways() {
        let wall = Aabb::new(Vec2::new(100.0, 60.0), Vec2::new(24.0, 48.0));
        let body = Aabb::new(Vec2::new(70.0, 60.0), Vec2::new(40.0, 44.0));

        let result = aabb_penetration(&body, &wall);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::NEG_X);
    }

    #[test]
    fn test_landing_cancels_fall() {
        let vel = resolve_velocity(Vec2::new(0.0, -300.0), Vec2::Y, 0.5);
        assert_eq!(vel, Vec2::ZERO);
    }

    #[test]
    fn test_friction_slows_sliding() {
        let vel = resolve_velocity(Vec2::new(100.0, -100.0), Vec2::Y, 0.5);
        assert!(vel.y.abs() < 1e-5);
        assert!((vel.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_separating_velocity_untouched() {
        let vel = Vec2::new(5.0, 300.0);
        assert_eq!(resolve_velocity(vel, Vec2::Y, 1.0), vel);
    }
}
