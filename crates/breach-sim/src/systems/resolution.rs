//! Death resolution: bounties, logic-bomb disruption and splitter fragments.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use breach_core::components::*;
use breach_core::constants::*;
use breach_core::enums::{DeathEffect, EffectKind};
use breach_core::events::SimEvent;
use breach_core::types::Point;

use crate::economy;
use crate::game_state::GameState;
use crate::systems::events::FrameModifiers;
use crate::world_setup::{self, IdAllocator};

/// Remove dead enemies and apply their side effects.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    state: &mut GameState,
    mods: &FrameModifiers,
    rng: &mut ChaCha8Rng,
    ids: &mut IdAllocator,
    now_ms: f64,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<SimEvent>,
) {
    despawn_buffer.clear();
    let mut dead: Vec<Enemy> = Vec::new();
    for (entity, enemy) in world.query_mut::<&Enemy>() {
        if enemy.health <= 0.0 {
            dead.push(enemy.clone());
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    dead.sort_by_key(|enemy| enemy.id);

    for enemy in dead {
        let bounty = enemy.bounty * mods.bounty;
        state.credits += bounty;
        events.push(SimEvent::EnemyKilled {
            enemy_id: enemy.id,
            enemy_type: enemy.enemy_type,
            bounty,
        });

        if enemy.enemy_type.def().death_effect == DeathEffect::Disrupt {
            disrupt(world, state, &enemy, now_ms, events);
        }

        if enemy.killed_by_splitter && !enemy.is_fragment && enemy.split_depth < MAX_SPLIT_DEPTH {
            let count = rng.gen_range(2..=3);
            for _ in 0..count {
                let fragment = split_fragment(&enemy, ids, rng);
                world_setup::spawn_enemy(world, fragment);
            }
            events.push(SimEvent::EnemySplit {
                enemy_id: enemy.id,
                fragments: count,
            });
        }
    }
}

/// Disable towers around a dead logic bomb and charge repair costs.
fn disrupt(
    world: &mut World,
    state: &mut GameState,
    bomb: &Enemy,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    let difficulty = state.difficulty;
    for (_entity, tower) in world.query_mut::<&mut Tower>() {
        if tower.pos.distance(bomb.pos) >= DISRUPTION_RADIUS {
            continue;
        }
        tower.disrupted_until_ms = now_ms + DISRUPTION_DURATION_MS;
        let penalty = if state.god_mode {
            0.0
        } else {
            (economy::invested_cost(tower.tower_type, tower.level, difficulty) * DISRUPTION_PENALTY)
                .floor()
        };
        state.charge(penalty);
        debug!(tower = tower.id.0, penalty, "tower disrupted");
        events.push(SimEvent::TowerDisrupted {
            tower_id: tower.id,
            penalty,
        });
    }
    world_setup::spawn_effect(
        world,
        EffectKind::Disruption,
        bomb.pos,
        DISRUPTION_RADIUS,
        now_ms,
        DISRUPTION_EFFECT_MS,
    );
}

/// A weaker, faster copy of a split enemy, jittered around its position.
pub fn split_fragment(parent: &Enemy, ids: &mut IdAllocator, rng: &mut ChaCha8Rng) -> Enemy {
    let max_health = parent.max_health * FRAGMENT_HP_FACTOR;
    let jitter_x = (rng.gen::<f64>() - 0.5) * FRAGMENT_JITTER;
    let jitter_y = (rng.gen::<f64>() - 0.5) * FRAGMENT_JITTER;
    Enemy {
        id: ids.enemy(),
        max_health,
        health: max_health,
        base_speed: parent.base_speed * FRAGMENT_SPEED_FACTOR,
        bounty: (parent.bounty * FRAGMENT_BOUNTY_FACTOR).floor(),
        is_boss: false,
        is_fragment: true,
        killed_by_splitter: false,
        split_depth: parent.split_depth + 1,
        pos: parent.pos + Point::new(jitter_x, jitter_y),
        ..parent.clone()
    }
}
