//! Projectile flight and impact.
//!
//! Projectiles chase a live enemy by id. A projectile whose target is gone is
//! discarded without effect.

use std::collections::HashMap;

use hecs::{Entity, World};

use breach_core::components::*;
use breach_core::constants::*;
use breach_core::enums::{EffectKind, TowerType};
use breach_core::types::{EnemyId, Point};

use crate::game_state::GameState;
use crate::world_setup;

/// A projectile that reached its target this frame.
#[derive(Debug, Clone)]
struct Impact {
    pos: Point,
    target: Entity,
    damage: f64,
    source: TowerType,
    slowing: bool,
    explosion_radius: f64,
    inverted: bool,
}

/// Apply a hit (or, inverted, a heal) to one enemy.
pub fn apply_hit(enemy: &mut Enemy, amount: f64, source: TowerType, inverted: bool) {
    if inverted {
        enemy.health = (enemy.health + amount * INVERTED_HEAL_FACTOR).min(enemy.max_health);
        return;
    }
    enemy.health -= amount;
    if enemy.health <= 0.0
        && source.def().splitter
        && !enemy.is_fragment
        && enemy.split_depth < MAX_SPLIT_DEPTH
    {
        enemy.killed_by_splitter = true;
    }
}

/// Damage dealt by an explosion at distance `d` from its centre.
pub fn falloff_damage(damage: f64, radius: f64, d: f64, aoe_resist: bool) -> f64 {
    let dealt = damage * (1.0 - d / radius);
    if aoe_resist {
        dealt * AOE_RESIST_FACTOR
    } else {
        dealt
    }
}

/// Move projectiles and resolve impacts.
pub fn run(
    world: &mut World,
    state: &GameState,
    dt_ms: f64,
    now_ms: f64,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    let targets: HashMap<EnemyId, (Entity, Point)> = world
        .query::<&Enemy>()
        .iter()
        .map(|(entity, enemy)| (enemy.id, (entity, enemy.pos)))
        .collect();

    let dt_s = dt_ms / 1000.0;
    let mut impacts: Vec<(u32, Impact)> = Vec::new();
    for (entity, projectile) in world.query_mut::<&mut Projectile>() {
        let Some(&(target, target_pos)) = targets.get(&projectile.target) else {
            despawn_buffer.push(entity);
            continue;
        };
        let to_target = target_pos - projectile.pos;
        let dist = to_target.length();
        if dist >= IMPACT_RADIUS {
            let step = (projectile.speed * dt_s * state.speed).min(dist);
            projectile.pos += to_target / dist * step;
        }
        if projectile.pos.distance(target_pos) < IMPACT_RADIUS {
            impacts.push((
                projectile.id,
                Impact {
                    pos: projectile.pos,
                    target,
                    damage: projectile.damage,
                    source: projectile.source,
                    slowing: projectile.slowing,
                    explosion_radius: projectile.explosion_radius,
                    inverted: projectile.inverted,
                },
            ));
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    impacts.sort_by_key(|(id, _)| *id);
    for (_, impact) in impacts {
        if impact.explosion_radius > 0.0 {
            explode(world, &impact, now_ms);
        } else if let Ok(mut enemy) = world.get::<&mut Enemy>(impact.target) {
            apply_hit(&mut enemy, impact.damage, impact.source, impact.inverted);
            if impact.slowing && !impact.inverted && !enemy.slow_immune {
                enemy.slow_timer_ms = SLOW_DURATION_MS;
            }
        }
    }
}

fn explode(world: &mut World, impact: &Impact, now_ms: f64) {
    for (_entity, enemy) in world.query_mut::<&mut Enemy>() {
        let d = enemy.pos.distance(impact.pos);
        if d < impact.explosion_radius {
            let dealt = falloff_damage(impact.damage, impact.explosion_radius, d, enemy.aoe_resist);
            apply_hit(enemy, dealt, impact.source, impact.inverted);
        }
    }
    world_setup::spawn_effect(
        world,
        EffectKind::Explosion,
        impact.pos,
        impact.explosion_radius,
        now_ms,
        EXPLOSION_EFFECT_MS,
    );
}
