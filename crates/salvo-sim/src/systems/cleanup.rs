//! Cleanup system: despawns destroyed munitions and targets.
//!
//! Runs last in the tick so every other system sees a consistent world.
//! Destruction is a status flag until then; a link to a despawned entity
//! is a lookup miss afterwards.

use hecs::{Entity, World};

use salvo_core::components::{Munition, Target};
use salvo_core::enums::{MunitionStatus, TargetStatus};

/// Remove munitions marked for removal and destroyed targets.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.extend(
        world
            .query::<&Munition>()
            .iter()
            .filter(|(_, m)| m.status == MunitionStatus::MarkedForRemoval)
            .map(|(entity, _)| entity),
    );
    despawn_buffer.extend(
        world
            .query::<&Target>()
            .iter()
            .filter(|(_, t)| t.status == TargetStatus::Destroyed)
            .map(|(entity, _)| entity),
    );

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
