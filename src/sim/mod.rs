//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded (or injected) RNG only
//! - Stable iteration order (by entity ID / body handle)
//! - No rendering, device or storage dependencies

pub mod collision;
pub mod contact;
pub mod difficulty;
pub mod entity;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, aabb_penetration};
pub use contact::{ContactEvent, ContactRouter};
pub use difficulty::{record_best, speed_factor};
pub use entity::{Entity, EntityId, EntityRegistry, EntityRole, Motion, Pose};
pub use physics::{Body, BodyHandle, BodySpec, ContactListener, PhysicsWorld};
pub use spawner::{RandomSource, SequenceRandom, SpawnPlan, Spawner, decide_spawn_plan};
pub use state::{EntityView, GameEvent, GamePhase, GameState, RenderSnapshot};
pub use tick::{TickInput, tick};
