//! Cleanup system: prunes expired visual effects.

use hecs::{Entity, World};

use breach_core::components::VisualEffect;

/// Remove effects whose duration has elapsed.
/// Uses a pre-allocated buffer to avoid per-frame allocation.
pub fn run(world: &mut World, now_ms: f64, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, effect) in world.query_mut::<&VisualEffect>() {
        if now_ms - effect.start_ms >= effect.duration_ms {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
