//! Contamination field and tower corruption (extended variant).
//!
//! Contaminating enemies seed the cell they stand on and its neighbours.
//! Towers soak up their cell's contamination as corruption; corrupted towers
//! occasionally fire healing shots and, past the betrayal threshold, spawn
//! hostile fragments onto the nearest path.

use std::collections::HashMap;

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use breach_core::components::{Enemy, Tower};
use breach_core::constants::*;
use breach_core::enums::{EffectKind, EnemyType};
use breach_core::events::SimEvent;
use breach_core::hex::HexCoord;
use breach_core::state::CellContamination;
use breach_core::types::{Point, TowerId};

use crate::game_state::GameState;
use crate::paths::PathSet;
use crate::systems::events::FrameModifiers;
use crate::world_setup::{self, IdAllocator};

/// Per-cell contamination in [0, 100].
#[derive(Debug, Clone, Default)]
pub struct ContaminationField {
    cells: HashMap<HexCoord, f64>,
}

impl ContaminationField {
    pub fn level(&self, coord: HexCoord) -> f64 {
        self.cells.get(&coord).copied().unwrap_or(0.0)
    }

    /// Add contamination to one cell, clamped to the maximum.
    pub fn add(&mut self, coord: HexCoord, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let cell = self.cells.entry(coord).or_insert(0.0);
        *cell = (*cell + amount).min(CONTAMINATION_MAX);
    }

    /// Add to a cell and a `neighbor_share` of the amount to each neighbour.
    pub fn spread(&mut self, coord: HexCoord, amount: f64, neighbor_share: f64) {
        self.add(coord, amount);
        for neighbor in coord.neighbors() {
            self.add(neighbor, amount * neighbor_share);
        }
    }

    /// Global contamination percentage: `CONTAMINATION_SATURATION_CELLS`
    /// fully contaminated cells read as 100.
    pub fn global(&self) -> f64 {
        let total: f64 = self.cells.values().sum();
        (total / CONTAMINATION_SATURATION_CELLS).min(CONTAMINATION_MAX)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Non-zero cells, sorted by coordinate.
    pub fn cells(&self) -> Vec<CellContamination> {
        let mut cells: Vec<CellContamination> = self
            .cells
            .iter()
            .filter(|(_, level)| **level > 0.0)
            .map(|(coord, level)| CellContamination {
                coord: *coord,
                level: *level,
            })
            .collect();
        cells.sort_by_key(|cell| cell.coord);
        cells
    }
}

/// Grow contamination and corruption, and roll betrayals.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    field: &mut ContaminationField,
    state: &GameState,
    paths: &PathSet,
    mods: &FrameModifiers,
    rng: &mut ChaCha8Rng,
    ids: &mut IdAllocator,
    dt_ms: f64,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    let scaled_secs = dt_ms * state.speed / 1000.0;
    if scaled_secs <= 0.0 {
        return;
    }

    let emit = CONTAMINATION_EMIT_PER_SEC * mods.contamination_growth * scaled_secs;
    for (_entity, enemy) in world.query::<&Enemy>().iter() {
        if enemy.enemy_type.def().contaminates {
            field.spread(HexCoord::from_pixel(enemy.pos), emit, CONTAMINATION_NEIGHBOR_SHARE);
        }
    }

    let betrayal_chance = BETRAYAL_CHANCE_PER_SEC * scaled_secs;
    let mut betrayals: Vec<(TowerId, Point)> = Vec::new();
    for (_entity, tower) in world.query_mut::<&mut Tower>() {
        let local = field.level(tower.coord);
        tower.corruption = (tower.corruption + local * CORRUPTION_GAIN_PER_SEC / 100.0 * scaled_secs)
            .min(CONTAMINATION_MAX);
        if tower.corruption > CORRUPTION_BETRAYAL_THRESHOLD && rng.gen::<f64>() < betrayal_chance {
            tower.corruption = (tower.corruption - BETRAYAL_CORRUPTION_RELIEF).max(0.0);
            betrayals.push((tower.id, tower.pos));
        }
    }

    for (tower_id, pos) in betrayals {
        let Some((path_id, index)) = paths.nearest_waypoint(pos) else {
            continue;
        };
        let Some(fragment) = world_setup::build_enemy(
            ids.enemy(),
            EnemyType::Fragment,
            state.wave,
            state.difficulty,
            paths,
            path_id,
            index,
        ) else {
            continue;
        };
        debug!(tower = tower_id.0, "tower betrayed");
        world_setup::spawn_effect(
            world,
            EffectKind::Betrayal,
            fragment.pos,
            HEX_SIZE,
            now_ms,
            BETRAYAL_EFFECT_MS,
        );
        world_setup::spawn_enemy(world, fragment);
        events.push(SimEvent::TowerBetrayed { tower_id });
    }
}
