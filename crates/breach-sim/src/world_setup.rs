//! Entity spawn factories and identifier allocation.

use hecs::{Entity, World};

use breach_core::components::*;
use breach_core::constants::HP_GROWTH_RATE;
use breach_core::enums::*;
use breach_core::hex::HexCoord;
use breach_core::types::{EnemyId, Point, TowerId};

use crate::paths::PathSet;

/// Monotonic identifiers for towers, enemies and projectiles.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_tower: u32,
    next_enemy: u32,
    next_projectile: u32,
}

impl IdAllocator {
    pub fn tower(&mut self) -> TowerId {
        self.next_tower += 1;
        TowerId(self.next_tower)
    }

    pub fn enemy(&mut self) -> EnemyId {
        self.next_enemy += 1;
        EnemyId(self.next_enemy)
    }

    pub fn projectile(&mut self) -> u32 {
        self.next_projectile += 1;
        self.next_projectile
    }
}

/// Health multiplier for enemies spawned in a given wave.
pub fn wave_hp_scale(wave: u32, difficulty: Difficulty) -> f64 {
    let exponent = wave.saturating_sub(1) as i32;
    HP_GROWTH_RATE.powi(exponent) * difficulty.def().hp_mult
}

/// Build an enemy standing on waypoint `start_index` of a path, walking
/// toward the next one. Returns `None` if the path has no such segment.
pub fn build_enemy(
    id: EnemyId,
    enemy_type: EnemyType,
    wave: u32,
    difficulty: Difficulty,
    paths: &PathSet,
    path_id: usize,
    start_index: usize,
) -> Option<Enemy> {
    let last_segment = paths.waypoint_count(path_id).checked_sub(2)?;
    let path_index = start_index.min(last_segment);
    let pos = paths.waypoint(path_id, path_index)?;
    let target_pos = paths.waypoint(path_id, path_index + 1)?;

    let def = enemy_type.def();
    let diff = difficulty.def();
    let max_health = def.hp * wave_hp_scale(wave, difficulty);

    Some(Enemy {
        id,
        enemy_type,
        pos,
        target_pos,
        max_health,
        health: max_health,
        base_speed: def.speed * diff.speed_mult,
        slow_multiplier: 1.0,
        slow_timer_ms: 0.0,
        path_id,
        path_index,
        progress: 0.0,
        bounty: def.bounty * diff.bounty_mult,
        is_boss: enemy_type == EnemyType::ZeroDay,
        is_fragment: enemy_type == EnemyType::Fragment,
        killed_by_splitter: false,
        slow_immune: false,
        aoe_resist: false,
        split_depth: 0,
    })
}

pub fn spawn_enemy(world: &mut World, enemy: Enemy) -> Entity {
    world.spawn((enemy,))
}

/// Spawn a level 1 tower centred on its cell.
pub fn spawn_tower(world: &mut World, id: TowerId, tower_type: TowerType, coord: HexCoord) -> Entity {
    world.spawn((Tower {
        id,
        tower_type,
        coord,
        pos: coord.to_pixel(),
        last_fired_ms: None,
        rotation: 0.0,
        level: 1,
        disrupted_until_ms: 0.0,
        interfered: false,
        patched: false,
        corruption: 0.0,
    },))
}

pub fn spawn_projectile(world: &mut World, projectile: Projectile) -> Entity {
    world.spawn((projectile,))
}

pub fn spawn_effect(
    world: &mut World,
    kind: EffectKind,
    pos: Point,
    radius: f64,
    start_ms: f64,
    duration_ms: f64,
) -> Entity {
    world.spawn((VisualEffect {
        kind,
        pos,
        radius,
        start_ms,
        duration_ms,
    },))
}

/// Find the entity of a tower by id.
pub fn find_tower(world: &World, tower_id: TowerId) -> Option<Entity> {
    world
        .query::<&Tower>()
        .iter()
        .find(|(_, tower)| tower.id == tower_id)
        .map(|(entity, _)| entity)
}

/// Find the tower occupying a cell.
pub fn tower_at(world: &World, coord: HexCoord) -> Option<TowerId> {
    world
        .query::<&Tower>()
        .iter()
        .find(|(_, tower)| tower.coord == coord)
        .map(|(_, tower)| tower.id)
}
