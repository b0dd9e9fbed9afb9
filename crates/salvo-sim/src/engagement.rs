//! Munition-to-target links.
//!
//! Which munition engages which target is decided outside the core; the link
//! only records the answer. A link to a despawned or destroyed target is a
//! lookup miss, never a dangling reference.

use hecs::{Entity, World};

use salvo_core::components::Target;
use salvo_core::types::KinematicState;

/// The target a munition is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLink {
    pub target: Option<Entity>,
}

impl TargetLink {
    pub fn new(target: Entity) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// The linked target's state, if it still exists and is tracked.
    pub fn resolve(&self, world: &World) -> Option<KinematicState> {
        let entity = self.target?;
        let target = world.get::<&Target>(entity).ok()?;
        target.is_tracked().then_some(target.state)
    }
}

/// Stable id handed to collaborators and written into events.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Inverse of [`entity_id`].
pub fn entity_from_id(id: u64) -> Option<Entity> {
    Entity::from_bits(id)
}
