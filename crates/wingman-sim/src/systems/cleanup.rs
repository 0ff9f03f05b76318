//! Cleanup system: removes craft that are destroyed or out of bounds.

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::debug;

use wingman_ai::AiContext;
use wingman_core::components::{Craft, Destroyed, Transform};
use wingman_core::constants::WORLD_RADIUS;
use wingman_core::ids::AgentId;

/// Despawn craft whose agent is dead, marked `Destroyed`, or beyond the world
/// boundary. Craft lost out of bounds are destroyed in the AI context first.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    ai: &mut AiContext,
    entities: &mut HashMap<AgentId, Entity>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    let radius_sq = WORLD_RADIUS * WORLD_RADIUS;

    for (entity, (craft, transform, destroyed)) in world
        .query::<(&Craft, &Transform, Option<&Destroyed>)>()
        .iter()
    {
        if transform.position.length_squared() > radius_sq {
            debug!(agent = %craft.agent, "craft left the world boundary");
            ai.destroy_agent(craft.agent);
        }
        if destroyed.is_some() || !ai.agents().is_alive(craft.agent) {
            entities.remove(&craft.agent);
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
