//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use breach_core::components::*;
use breach_core::events::SimEvent;
use breach_core::state::*;
use breach_core::types::SimTime;

use crate::game_state::GameState;
use crate::paths::PathSet;
use crate::systems::contamination::ContaminationField;

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    state: &GameState,
    paths: &PathSet,
    field: &ContaminationField,
    events: Vec<SimEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        credits: state.credits,
        health: state.health,
        wave: state.wave,
        game_over: state.game_over,
        wave_active: state.wave_active,
        speed: state.speed,
        auto_start: state.auto_start,
        god_mode: state.god_mode,
        difficulty: state.difficulty,
        extended: state.extended,
        towers: build_towers(world),
        enemies: build_enemies(world),
        projectiles: build_projectiles(world),
        effects: build_effects(world),
        active_event: state.active_event.clone(),
        global_contamination: field.global(),
        contamination: field.cells(),
        paths: paths.paths().to_vec(),
        events,
    }
}

fn build_towers(world: &World) -> Vec<Tower> {
    let mut towers: Vec<Tower> = world
        .query::<&Tower>()
        .iter()
        .map(|(_, tower)| tower.clone())
        .collect();
    towers.sort_by_key(|t| t.id);
    towers
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<&Enemy>()
        .iter()
        .map(|(_, enemy)| EnemyView {
            id: enemy.id,
            enemy_type: enemy.enemy_type,
            pos: enemy.pos,
            health: enemy.health,
            max_health: enemy.max_health,
            is_boss: enemy.is_boss,
            is_fragment: enemy.is_fragment,
            slowed: enemy.slow_timer_ms > 0.0,
            slow_immune: enemy.slow_immune,
            aoe_resist: enemy.aoe_resist,
        })
        .collect();
    enemies.sort_by_key(|e| e.id);
    enemies
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<&Projectile>()
        .iter()
        .map(|(_, projectile)| ProjectileView {
            id: projectile.id,
            pos: projectile.pos,
            source: projectile.source,
            explosive: projectile.explosion_radius > 0.0,
            inverted: projectile.inverted,
        })
        .collect();
    projectiles.sort_by_key(|p| p.id);
    projectiles
}

fn build_effects(world: &World) -> Vec<VisualEffect> {
    let mut effects: Vec<VisualEffect> = world
        .query::<&VisualEffect>()
        .iter()
        .map(|(_, effect)| effect.clone())
        .collect();
    effects.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
    effects
}
