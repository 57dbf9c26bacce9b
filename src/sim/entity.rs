//! Typed game objects and the registry that owns them
//!
//! Every entity wraps exactly one physics body. The registry keeps the two
//! in lockstep: spawning adds the body, destroying removes it.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{BodyHandle, BodySpec, PhysicsWorld};
use crate::consts::{CATEGORY_CHARACTER, CATEGORY_GROUND, CATEGORY_OBSTACLE};
use crate::tuning::Tuning;

/// Stable entity identifier (sorted for deterministic iteration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRole {
    Ground,
    Character,
    Obstacle,
}

impl EntityRole {
    pub fn name(&self) -> &'static str {
        match self {
            EntityRole::Ground => "ground",
            EntityRole::Character => "character",
            EntityRole::Obstacle => "obstacle",
        }
    }

    /// Whether the score-derived speed factor applies
    pub fn scrolls(&self) -> bool {
        matches!(self, EntityRole::Ground | EntityRole::Obstacle)
    }

    /// Physics body preset for this role
    pub fn body_spec(&self, tuning: &Tuning) -> BodySpec {
        match self {
            EntityRole::Ground => BodySpec::fixed(tuning.ground_size(), CATEGORY_GROUND)
                .with_contacts(CATEGORY_CHARACTER)
                .with_friction(tuning.ground_friction),
            EntityRole::Character => BodySpec::dynamic(
                tuning.character_size,
                CATEGORY_CHARACTER,
                tuning.character_mass,
            )
            .with_contacts(CATEGORY_GROUND | CATEGORY_OBSTACLE)
            .with_collisions(CATEGORY_GROUND | CATEGORY_OBSTACLE)
            .with_friction(tuning.character_friction),
            EntityRole::Obstacle => BodySpec::fixed(tuning.obstacle_size, CATEGORY_OBSTACLE)
                .with_contacts(CATEGORY_CHARACTER)
                .with_collisions(CATEGORY_CHARACTER),
        }
    }
}

/// Visual state for the renderer (animation selection only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pose {
    /// Standing still before the first tap
    #[default]
    Idle,
    /// Run-cycle animation looping
    Running,
    /// Animation stopped on the failure frame
    Dead,
    /// Scenery with no animation
    Static,
}

/// Scripted movement for non-dynamic bodies.
///
/// Motions advance by `dt * speed`, so the speed factor shortens them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Translate left by `distance` over `period`, then snap back (forever)
    Loop {
        origin: Vec2,
        distance: f32,
        period: f32,
        elapsed: f32,
    },
    /// Translate from `from` to `to` over `lifetime`, then finish
    Scroll {
        from: Vec2,
        to: Vec2,
        lifetime: f32,
        elapsed: f32,
    },
}

impl Motion {
    pub fn looping(origin: Vec2, distance: f32, period: f32) -> Self {
        Motion::Loop {
            origin,
            distance,
            period,
            elapsed: 0.0,
        }
    }

    pub fn scroll(from: Vec2, to: Vec2, lifetime: f32) -> Self {
        Motion::Scroll {
            from,
            to,
            lifetime,
            elapsed: 0.0,
        }
    }

    /// Advance and return (new position, finished)
    pub fn advance(&mut self, dt: f32, speed: f32) -> (Vec2, bool) {
        match self {
            Motion::Loop {
                origin,
                distance,
                period,
                elapsed,
            } => {
                *elapsed = (*elapsed + dt * speed) % *period;
                let offset = *distance * (*elapsed / *period);
                (*origin - Vec2::new(offset, 0.0), false)
            }
            Motion::Scroll {
                from,
                to,
                lifetime,
                elapsed,
            } => {
                *elapsed += dt * speed;
                let t = (*elapsed / *lifetime).min(1.0);
                (from.lerp(*to, t), *elapsed >= *lifetime)
            }
        }
    }
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    role: EntityRole,
    body: BodyHandle,
    /// Box size (matches the body)
    pub size: Vec2,
    pub pose: Pose,
    /// Scripted movement, if any
    pub motion: Option<Motion>,
    /// Motion speed multiplier
    pub speed: f32,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn role(&self) -> EntityRole {
        self.role
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

/// Owns all entities and their bodies
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    by_body: BTreeMap<BodyHandle, EntityId>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            by_body: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create an entity and its body
    pub fn spawn(
        &mut self,
        physics: &mut PhysicsWorld,
        role: EntityRole,
        position: Vec2,
        spec: BodySpec,
    ) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let size = spec.size;
        let body = physics.add_body(spec, position);
        let pose = if role == EntityRole::Character {
            Pose::Idle
        } else {
            Pose::Static
        };
        self.entities.insert(
            id,
            Entity {
                id,
                role,
                body,
                size,
                pose,
                motion: None,
                speed: 1.0,
            },
        );
        self.by_body.insert(body, id);
        id
    }

    /// Destroy an entity together with its body. Returns false if unknown.
    pub fn destroy(&mut self, physics: &mut PhysicsWorld, id: EntityId) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            return false;
        };
        self.by_body.remove(&entity.body);
        let removed = physics.remove_body(entity.body);
        debug_assert!(removed, "entity {:?} had no live body", id);
        true
    }

    /// Destroy everything
    pub fn clear(&mut self, physics: &mut PhysicsWorld) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            self.destroy(physics, id);
        }
    }

    /// All live entities with a role, ordered by id
    pub fn find(&self, role: EntityRole) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.role == role)
            .map(|e| e.id)
            .collect()
    }

    /// Entity owning a body (None for stale handles)
    pub fn resolve(&self, body: BodyHandle) -> Option<EntityId> {
        self.by_body.get(&body).copied()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// The session's character, if spawned
    pub fn character(&self) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.role == EntityRole::Character)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Advance scripted motions, move their bodies, and destroy entities
    /// whose motion finished. Returns the destroyed ids.
    pub fn advance_motions(&mut self, physics: &mut PhysicsWorld, dt: f32) -> Vec<EntityId> {
        let mut finished = Vec::new();
        for entity in self.entities.values_mut() {
            let speed = entity.speed;
            let Some(motion) = entity.motion.as_mut() else {
                continue;
            };
            let (pos, done) = motion.advance(dt, speed);
            physics.set_position(entity.body, pos);
            if done {
                finished.push(entity.id);
            }
        }
        for id in &finished {
            self.destroy(physics, *id);
        }
        finished
    }
}
