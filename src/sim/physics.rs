//! 2D rigid-body world
//!
//! Owns every body, integrates the dynamic ones under gravity, pushes them
//! out of whatever their collision mask says they collide with, and reports
//! the *start* of each contact to a [`ContactListener`].
//!
//! Contact rules:
//! - A pair produces contact events iff either body's category is in the
//!   other's contact mask.
//! - A dynamic body is pushed out of another iff the other's category is in
//!   the dynamic body's collision mask.
//! - Non-dynamic bodies never move on their own; their owner positions them.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    Aabb, CONTACT_SLOP, aabb_penetration, mix_friction, resolve_velocity,
};

/// Opaque body identifier. Never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(u32);

/// Body creation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    /// Box size
    pub size: Vec2,
    /// What this body is (fixed for its lifetime)
    pub category: u32,
    /// Categories whose touch should be reported
    pub contact_mask: u32,
    /// Categories this body is physically pushed out of
    pub collision_mask: u32,
    /// Moved by the integrator (otherwise positioned externally)
    pub dynamic: bool,
    pub affected_by_gravity: bool,
    pub friction: f32,
    pub mass: f32,
}

impl BodySpec {
    /// Immovable box
    pub fn fixed(size: Vec2, category: u32) -> Self {
        Self {
            size,
            category,
            contact_mask: 0,
            collision_mask: 0,
            dynamic: false,
            affected_by_gravity: false,
            friction: 0.0,
            mass: 1.0,
        }
    }

    /// Gravity-driven box
    pub fn dynamic(size: Vec2, category: u32, mass: f32) -> Self {
        Self {
            dynamic: true,
            affected_by_gravity: true,
            mass,
            ..Self::fixed(size, category)
        }
    }

    pub fn with_contacts(mut self, mask: u32) -> Self {
        self.contact_mask = mask;
        self
    }

    pub fn with_collisions(mut self, mask: u32) -> Self {
        self.collision_mask = mask;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Whether a pair of bodies reports contacts
    #[inline]
    pub fn reports_contact_with(&self, other: &BodySpec) -> bool {
        self.category & other.contact_mask != 0 || other.category & self.contact_mask != 0
    }

    /// Whether this body is pushed out of `other`
    #[inline]
    pub fn collides_with(&self, other: &BodySpec) -> bool {
        self.collision_mask & other.category != 0
    }
}

/// A live body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub spec: BodySpec,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Body {
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.spec.size)
    }
}

/// Receives raw contact-begin notifications
pub trait ContactListener {
    fn on_contact_begin(&mut self, a: BodyHandle, b: BodyHandle);
}

/// Collects raw pairs (handy for tests and debugging)
impl ContactListener for Vec<(BodyHandle, BodyHandle)> {
    fn on_contact_begin(&mut self, a: BodyHandle, b: BodyHandle) {
        self.push((a, b));
    }
}

/// The simulation world
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    gravity: Vec2,
    bodies: BTreeMap<BodyHandle, Body>,
    /// Pairs touching at the end of the last step (lower handle first)
    touching: BTreeSet<(BodyHandle, BodyHandle)>,
    paused: bool,
    next_handle: u32,
}

impl PhysicsWorld {
    /// New, empty, paused world
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: BTreeMap::new(),
            touching: BTreeSet::new(),
            paused: true,
            next_handle: 1,
        }
    }

    pub fn add_body(&mut self, spec: BodySpec, pos: Vec2) -> BodyHandle {
        debug_assert!(spec.mass > 0.0, "body mass must be positive");
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            Body {
                spec,
                pos,
                vel: Vec2::ZERO,
            },
        );
        handle
    }

    /// Remove a body and forget its contacts. Returns false if already gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies.remove(&handle).is_none() {
            return false;
        }
        self.touching.retain(|&(a, b)| a != handle && b != handle);
        true
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Instant velocity change of `impulse / mass` (dynamic bodies only)
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            if body.spec.dynamic {
                body.vel += impulse / body.spec.mass;
            }
        }
    }

    /// Teleport a body (used to drive non-dynamic bodies)
    pub fn set_position(&mut self, handle: BodyHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
        }
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.vel)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    /// Whether two bodies were touching after the last step
    pub fn are_touching(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.touching.contains(&ordered(a, b))
    }

    /// Advance the world by `dt`. No-op while paused.
    pub fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        if self.paused {
            return;
        }

        self.integrate(dt);
        self.resolve_collisions();

        let now = self.find_touching();
        for &(a, b) in &now {
            if !self.touching.contains(&(a, b)) {
                listener.on_contact_begin(a, b);
            }
        }
        self.touching = now;
    }

    /// Semi-implicit Euler on dynamic bodies
    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.spec.dynamic) {
            if body.spec.affected_by_gravity {
                body.vel += gravity * dt;
            }
            body.pos += body.vel * dt;
        }
    }

    /// Push dynamic bodies out of the bodies they collide with
    fn resolve_collisions(&mut self) {
        let dynamic: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.spec.dynamic)
            .map(|(h, _)| *h)
            .collect();

        for handle in dynamic {
            let obstacles: Vec<(Aabb, f32)> = match self.bodies.get(&handle) {
                Some(body) => self
                    .bodies
                    .iter()
                    .filter(|(other, b)| **other != handle && body.spec.collides_with(&b.spec))
                    .map(|(_, b)| (b.aabb(), b.spec.friction))
                    .collect(),
                None => continue,
            };

            let Some(body) = self.bodies.get_mut(&handle) else {
                continue;
            };
            for (other, other_friction) in obstacles {
                let result = aabb_penetration(&body.aabb(), &other);
                if result.hit {
                    body.pos += result.normal * result.penetration;
                    let friction = mix_friction(body.spec.friction, other_friction);
                    body.vel = resolve_velocity(body.vel, result.normal, friction);
                }
            }
        }
    }

    /// Sort-and-sweep on x, then exact box test with slop
    fn find_touching(&self) -> BTreeSet<(BodyHandle, BodyHandle)> {
        let mut sorted: Vec<(BodyHandle, &Body, Aabb)> = self
            .bodies
            .iter()
            .map(|(h, b)| (*h, b, b.aabb()))
            .collect();
        sorted.sort_by(|a, b| {
            a.2.min()
                .x
                .partial_cmp(&b.2.min().x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let mut pairs = BTreeSet::new();
        for (i, (ha, a, box_a)) in sorted.iter().enumerate() {
            let reach = box_a.max().x + CONTACT_SLOP;
            for (hb, b, box_b) in sorted[i + 1..].iter() {
                if box_b.min().x > reach {
                    break;
                }
                if a.spec.reports_contact_with(&b.spec) && box_a.touches(box_b, CONTACT_SLOP) {
                    pairs.insert(ordered(*ha, *hb));
                }
            }
        }
        pairs
    }
}

#[inline]
fn ordered(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: u32 = 1;
    const BOX: u32 = 2;
    const WALL: u32 = 4;
    const DT: f32 = 1.0 / 120.0;

    fn world_with_floor() -> (PhysicsWorld, BodyHandle) {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -2000.0));
        let floor = world.add_body(
            BodySpec::fixed(Vec2::new(1000.0, 40.0), FLOOR).with_contacts(BOX),
            Vec2::new(0.0, 20.0),
        );
        world.set_paused(false);
        (world, floor)
    }

    fn falling_box(world: &mut PhysicsWorld, y: f32) -> BodyHandle {
        world.add_body(
            BodySpec::dynamic(Vec2::new(40.0, 40.0), BOX, 1.0)
                .with_contacts(FLOOR | WALL)
                .with_collisions(FLOOR),
            Vec2::new(0.0, y),
        )
    }

    #[test]
    fn test_new_world_is_paused() {
        let world = PhysicsWorld::new(Vec2::ZERO);
        assert!(world.is_paused());
    }

    #[test]
    fn test_box_lands_and_reports_once() {
        let (mut world, floor) = world_with_floor();
        let body = falling_box(&mut world, 200.0);

        let mut contacts = Vec::new();
        for _ in 0..240 {
            world.step(DT, &mut contacts);
        }

        assert_eq!(contacts, vec![(floor, body)]);
        let pos = world.position(body).unwrap();
        assert!((pos.y - 60.0).abs() < 1.0, "box should rest on floor, y={}", pos.y);
        assert!(world.velocity(body).unwrap().y.abs() < 50.0);
    }

    #[test]
    fn test_paused_world_is_frozen() {
        let (mut world, _) = world_with_floor();
        let body = falling_box(&mut world, 200.0);
        world.set_paused(true);

        let mut contacts = Vec::new();
        for _ in 0..100 {
            world.step(DT, &mut contacts);
        }
        assert_eq!(world.position(body), Some(Vec2::new(0.0, 200.0)));
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_resume_continues_from_same_state() {
        let (mut world, _) = world_with_floor();
        let body = falling_box(&mut world, 200.0);
        let mut contacts = Vec::new();

        world.step(DT, &mut contacts);
        let before = world.position(body).unwrap();
        world.set_paused(true);
        world.step(DT, &mut contacts);
        world.set_paused(false);

        let mut reference = world.clone();
        world.step(DT, &mut contacts);
        reference.step(DT, &mut Vec::new());
        assert!(before.y > world.position(body).unwrap().y);
        assert_eq!(world.position(body), reference.position(body));
    }

    #[test]
    fn test_no_contact_without_mask_overlap() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.set_paused(false);
        world.add_body(BodySpec::fixed(Vec2::splat(20.0), WALL), Vec2::ZERO);
        world.add_body(BodySpec::fixed(Vec2::splat(20.0), FLOOR), Vec2::new(5.0, 0.0));

        let mut contacts = Vec::new();
        world.step(DT, &mut contacts);
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_contact_without_collision_passes_through() {
        let (mut world, _) = world_with_floor();
        let body = falling_box(&mut world, 300.0);
        let wall = world.add_body(
            BodySpec::fixed(Vec2::new(20.0, 100.0), WALL),
            Vec2::new(0.0, 200.0),
        );

        let mut contacts = Vec::new();
        for _ in 0..60 {
            world.step(DT, &mut contacts);
        }
        // Reported, but not pushed out: the box keeps falling through the wall
        assert!(contacts.contains(&(body, wall)));
        assert!(world.position(body).unwrap().y < 200.0);
    }

    #[test]
    fn test_impulse_ignores_fixed_bodies() {
        let (mut world, floor) = world_with_floor();
        world.apply_impulse(floor, Vec2::new(0.0, 100.0));
        assert_eq!(world.velocity(floor), Some(Vec2::ZERO));

        let body = world.add_body(
            BodySpec::dynamic(Vec2::splat(10.0), BOX, 2.0),
            Vec2::new(0.0, 500.0),
        );
        world.apply_impulse(body, Vec2::new(0.0, 100.0));
        assert_eq!(world.velocity(body), Some(Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn test_remove_body_forgets_contacts() {
        let (mut world, floor) = world_with_floor();
        let body = falling_box(&mut world, 60.2);
        let mut contacts = Vec::new();
        world.step(DT, &mut contacts);
        assert!(world.are_touching(floor, body));

        assert!(world.remove_body(body));
        assert!(!world.are_touching(floor, body));
        assert!(!world.remove_body(body));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let a = world.add_body(BodySpec::fixed(Vec2::ONE, BOX), Vec2::ZERO);
        world.remove_body(a);
        let b = world.add_body(BodySpec::fixed(Vec2::ONE, BOX), Vec2::ZERO);
        assert_ne!(a, b);
    }
}
