//! Raw contact → semantic event routing
//!
//! The physics world reports body pairs. Gameplay only cares about what the
//! character touched, so the router turns each pair into at most one
//! [`ContactEvent`] naming the other party.

use serde::{Deserialize, Serialize};

use super::entity::{EntityRegistry, EntityRole};
use super::physics::{BodyHandle, ContactListener};

/// The character touched something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Role of the entity the character touched
    pub other: EntityRole,
}

impl ContactEvent {
    /// "ground" or "obstacle"
    pub fn role_name(&self) -> &'static str {
        self.other.name()
    }
}

/// Resolves raw pairs against the registry for the duration of one step
pub struct ContactRouter<'a> {
    registry: &'a EntityRegistry,
    events: Vec<ContactEvent>,
}

impl<'a> ContactRouter<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self {
            registry,
            events: Vec::new(),
        }
    }

    /// Events routed so far, in delivery order
    pub fn into_events(self) -> Vec<ContactEvent> {
        self.events
    }

    fn route(&self, a: BodyHandle, b: BodyHandle) -> Option<ContactEvent> {
        let (Some(a), Some(b)) = (self.registry.resolve(a), self.registry.resolve(b)) else {
            log::debug!("discarding contact with destroyed body ({:?}, {:?})", a, b);
            return None;
        };
        let role_a = self.registry.get(a)?.role();
        let role_b = self.registry.get(b)?.role();

        let other = match (role_a, role_b) {
            (EntityRole::Character, other) => other,
            (other, EntityRole::Character) => other,
            _ => return None,
        };
        Some(ContactEvent { other })
    }
}

impl ContactListener for ContactRouter<'_> {
    fn on_contact_begin(&mut self, a: BodyHandle, b: BodyHandle) {
        if let Some(event) = self.route(a, b) {
            self.events.push(event);
        }
    }
}
