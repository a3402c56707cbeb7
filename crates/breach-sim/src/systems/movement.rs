//! Enemy advance along the ingress paths.
//!
//! Speeds are tuned per 60 Hz reference frame, so the per-frame step is
//! scaled by the real frame length. Leftover progress carries into the next
//! segment, which keeps long frames from losing distance.

use hecs::{Entity, World};
use tracing::info;

use breach_core::components::Enemy;
use breach_core::constants::*;
use breach_core::events::SimEvent;

use crate::game_state::GameState;
use crate::paths::PathSet;
use crate::systems::events::FrameModifiers;

/// Outcome of walking one enemy for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Walking,
    /// Passed the final waypoint.
    Leaked,
}

/// Update the slow timer and return the personal speed multiplier.
pub fn update_slow(enemy: &mut Enemy, scaled_dt_ms: f64) -> f64 {
    if enemy.slow_timer_ms > 0.0 {
        enemy.slow_timer_ms = (enemy.slow_timer_ms - scaled_dt_ms).max(0.0);
        enemy.slow_multiplier = SLOW_FACTOR;
    } else {
        enemy.slow_multiplier = 1.0;
    }
    enemy.slow_multiplier
}

/// Segment progress covered this frame.
pub fn step_length(effective_speed: f64, dt_ms: f64, speed: f64) -> f64 {
    effective_speed * MOVE_SCALE * (dt_ms / REFERENCE_FRAME_MS) * speed
}

/// Move an enemy `step` segments forward along its path.
pub fn advance(enemy: &mut Enemy, paths: &PathSet, step: f64) -> Advance {
    let final_waypoint = paths.waypoint_count(enemy.path_id).saturating_sub(1);
    let mut remaining = step;
    while remaining > 0.0 {
        let left = 1.0 - enemy.progress;
        if remaining < left {
            enemy.pos += (enemy.target_pos - enemy.pos) * (remaining / left);
            enemy.progress += remaining;
            break;
        }
        remaining -= left;
        enemy.pos = enemy.target_pos;
        enemy.progress = 0.0;
        enemy.path_index += 1;
        if enemy.path_index >= final_waypoint {
            return Advance::Leaked;
        }
        match paths.waypoint(enemy.path_id, enemy.path_index + 1) {
            Some(next) => enemy.target_pos = next,
            None => return Advance::Leaked,
        }
    }
    Advance::Walking
}

/// Advance every enemy; enemies that reach the core damage it and are removed.
pub fn run(
    world: &mut World,
    paths: &PathSet,
    state: &mut GameState,
    mods: &FrameModifiers,
    dt_ms: f64,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<SimEvent>,
) {
    despawn_buffer.clear();
    let scaled_dt_ms = dt_ms * state.speed;

    for (entity, enemy) in world.query_mut::<&mut Enemy>() {
        let slow = update_slow(enemy, scaled_dt_ms);
        let effective = enemy.base_speed * slow * mods.enemy_speed;
        let step = step_length(effective, dt_ms, state.speed);

        if advance(enemy, paths, step) == Advance::Leaked {
            let damage = if enemy.is_boss {
                BOSS_LEAK_DAMAGE
            } else {
                LEAK_DAMAGE
            };
            events.push(SimEvent::EnemyLeaked {
                enemy_type: enemy.enemy_type,
                damage: if state.god_mode { 0.0 } else { damage },
            });
            if state.damage_core(damage) {
                info!(wave = state.wave, "core integrity lost, game over");
                events.push(SimEvent::GameOver { wave: state.wave });
            }
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
