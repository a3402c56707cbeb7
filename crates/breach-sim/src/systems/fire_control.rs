//! Fire control system: tower cooldowns, target selection and projectile launch.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use breach_core::components::*;
use breach_core::constants::*;
use breach_core::types::{EnemyId, Point};

use crate::game_state::GameState;
use crate::systems::events::FrameModifiers;
use crate::world_setup::{self, IdAllocator};

/// Level scaling of a tower's base stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelFactors {
    pub damage: f64,
    pub range: f64,
    pub fire_rate: f64,
}

pub fn level_factors(level: u8) -> LevelFactors {
    let above = f64::from(level.saturating_sub(1));
    LevelFactors {
        damage: LEVEL_DAMAGE_GROWTH.powf(above),
        range: 1.0 + LEVEL_RANGE_STEP * above,
        fire_rate: 1.0 + LEVEL_FIRE_RATE_STEP * above,
    }
}

/// Explosion radius of an explosive tower at a given level.
pub fn explosion_radius(level: u8) -> f64 {
    EXPLOSION_BASE_RADIUS + EXPLOSION_RADIUS_PER_LEVEL * f64::from(level)
}

/// Chance that a shot from a tower with this corruption is inverted.
pub fn inversion_chance(corruption: f64) -> f64 {
    ((corruption - CORRUPTION_INVERT_THRESHOLD) / 100.0).max(0.0)
}

/// Nearest enemy strictly inside `range`. Ties keep the earlier entry.
pub fn nearest_in_range(origin: Point, range: f64, enemies: &[(EnemyId, Point)]) -> Option<EnemyId> {
    let mut best = None;
    let mut best_dist = range;
    for &(id, pos) in enemies {
        let d = origin.distance(pos);
        if d < best_dist {
            best_dist = d;
            best = Some(id);
        }
    }
    best
}

/// Run the fire control system for one frame.
pub fn run(
    world: &mut World,
    state: &GameState,
    mods: &FrameModifiers,
    rng: &mut ChaCha8Rng,
    ids: &mut IdAllocator,
    now_ms: f64,
) {
    let mut enemies: Vec<(EnemyId, Point)> = world
        .query::<&Enemy>()
        .iter()
        .filter(|(_, enemy)| enemy.health > 0.0)
        .map(|(_, enemy)| (enemy.id, enemy.pos))
        .collect();
    enemies.sort_by_key(|(id, _)| *id);

    let mut launches = Vec::new();
    for (_entity, tower) in world.query_mut::<&mut Tower>() {
        if tower.disrupted_until_ms > now_ms {
            continue;
        }
        let def = tower.tower_type.def();
        let level = level_factors(tower.level);
        let (mark_fire, mark_range) = mods.mark_factors(tower);
        let fire_factor = level.fire_rate * mark_fire * mods.fire_rate;
        let range = def.range * level.range * mark_range * mods.tower_range;

        tower.rotation += ROTATION_RATE * state.speed * fire_factor;

        let cooldown_ms = 1000.0 / (def.fire_rate * fire_factor) / state.speed;
        let ready = tower
            .last_fired_ms
            .map_or(true, |last| now_ms - last > cooldown_ms);
        if !ready {
            continue;
        }
        let Some(target) = nearest_in_range(tower.pos, range, &enemies) else {
            continue;
        };

        let mut damage = def.damage * level.damage;
        let (speed, radius) = if def.explosive {
            damage *= mods.explosive_yield;
            (
                EXPLOSIVE_PROJECTILE_SPEED,
                explosion_radius(tower.level) * mods.explosive_yield,
            )
        } else {
            (PROJECTILE_SPEED, 0.0)
        };
        let inverted = state.extended
            && tower.corruption > CORRUPTION_INVERT_THRESHOLD
            && rng.gen::<f64>() < inversion_chance(tower.corruption);

        launches.push(Projectile {
            id: 0,
            pos: tower.pos,
            target,
            damage,
            speed,
            source: tower.tower_type,
            slowing: def.slowing,
            explosion_radius: radius,
            inverted,
        });
        tower.last_fired_ms = Some(now_ms);
    }

    for mut projectile in launches {
        projectile.id = ids.projectile();
        world_setup::spawn_projectile(world, projectile);
    }
}
