//! Placement economy: tower costs, upgrades and salvage.
//!
//! All prices scale with the difficulty's cost multiplier. In god mode
//! nothing is charged, but refunds are still paid out.

use hecs::World;
use tracing::debug;

use breach_core::components::Tower;
use breach_core::constants::*;
use breach_core::enums::{Difficulty, TowerType};
use breach_core::error::CommandRejected;
use breach_core::events::SimEvent;
use breach_core::hex::HexCoord;
use breach_core::types::TowerId;

use crate::game_state::GameState;
use crate::paths::{in_grid, PathSet};
use crate::systems::contamination::ContaminationField;
use crate::systems::events::modifiers;
use crate::world_setup::{self, IdAllocator};

/// Price of a new tower, rounded to the cent.
pub fn placement_cost(tower_type: TowerType, difficulty: Difficulty) -> f64 {
    (tower_type.def().cost * difficulty.def().cost_mult * 100.0).round() / 100.0
}

/// Price of raising a tower from `level` to `level + 1`.
pub fn upgrade_cost(tower_type: TowerType, level: u8, difficulty: Difficulty) -> f64 {
    placement_cost(tower_type, difficulty) * f64::from(level + 1)
}

/// Everything paid for a tower up to `level`: `base · (1 + Σ_{k=2..level} k)`.
pub fn invested_cost(tower_type: TowerType, level: u8, difficulty: Difficulty) -> f64 {
    let steps: u32 = (2..=u32::from(level)).sum();
    placement_cost(tower_type, difficulty) * (1.0 + f64::from(steps))
}

/// Credits returned for salvaging a tower.
pub fn salvage_refund(tower: &Tower, difficulty: Difficulty, extended: bool) -> f64 {
    let mut fraction = SALVAGE_REFUND;
    if extended {
        fraction *= 1.0 - SALVAGE_CORRUPTION_PENALTY * tower.corruption / CONTAMINATION_MAX;
    }
    (invested_cost(tower.tower_type, tower.level, difficulty) * fraction).floor()
}

/// Place a level 1 tower on an empty, off-path grid cell.
pub fn place_tower(
    world: &mut World,
    state: &mut GameState,
    paths: &PathSet,
    ids: &mut IdAllocator,
    tower_type: TowerType,
    coord: HexCoord,
    events: &mut Vec<SimEvent>,
) -> Result<TowerId, CommandRejected> {
    if state.game_over {
        return Err(CommandRejected::GameOver);
    }
    if !in_grid(coord) {
        return Err(CommandRejected::OutOfGrid(coord));
    }
    if paths.is_on_active_path(coord) {
        return Err(CommandRejected::OnPath(coord));
    }
    if world_setup::tower_at(world, coord).is_some() {
        return Err(CommandRejected::Occupied(coord));
    }
    let cost = placement_cost(tower_type, state.difficulty);
    if !state.god_mode {
        if state.credits < cost {
            return Err(CommandRejected::InsufficientCredits {
                needed: cost,
                available: state.credits,
            });
        }
        state.charge(cost);
    }

    let tower_id = ids.tower();
    world_setup::spawn_tower(world, tower_id, tower_type, coord);
    debug!(tower = tower_id.0, ?tower_type, %coord, cost, "tower placed");
    events.push(SimEvent::TowerPlaced {
        tower_id,
        tower_type,
        coord,
    });
    Ok(tower_id)
}

/// Raise a tower by one level. Returns the new level.
pub fn upgrade_tower(
    world: &mut World,
    state: &mut GameState,
    tower_id: TowerId,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) -> Result<u8, CommandRejected> {
    if state.game_over {
        return Err(CommandRejected::GameOver);
    }
    let entity =
        world_setup::find_tower(world, tower_id).ok_or(CommandRejected::UnknownTower(tower_id))?;
    let mut tower = world
        .get::<&mut Tower>(entity)
        .map_err(|_| CommandRejected::UnknownTower(tower_id))?;
    if tower.level >= MAX_TOWER_LEVEL {
        return Err(CommandRejected::MaxLevel(tower_id));
    }
    if modifiers(state.active_event.as_ref(), now_ms).locks_upgrades {
        return Err(CommandRejected::Lockdown);
    }
    let cost = upgrade_cost(tower.tower_type, tower.level, state.difficulty);
    if !state.god_mode {
        if state.credits < cost {
            return Err(CommandRejected::InsufficientCredits {
                needed: cost,
                available: state.credits,
            });
        }
        state.charge(cost);
    }
    tower.level += 1;
    let level = tower.level;
    debug!(tower = tower_id.0, level, cost, "tower upgraded");
    events.push(SimEvent::TowerUpgraded { tower_id, level });
    Ok(level)
}

/// Remove a tower for a partial refund. Returns the refund.
pub fn salvage_tower(
    world: &mut World,
    state: &mut GameState,
    field: &mut ContaminationField,
    tower_id: TowerId,
    events: &mut Vec<SimEvent>,
) -> Result<f64, CommandRejected> {
    if state.game_over {
        return Err(CommandRejected::GameOver);
    }
    let entity =
        world_setup::find_tower(world, tower_id).ok_or(CommandRejected::UnknownTower(tower_id))?;
    let tower = world
        .remove_one::<Tower>(entity)
        .map_err(|_| CommandRejected::UnknownTower(tower_id))?;
    let _ = world.despawn(entity);

    let refund = salvage_refund(&tower, state.difficulty, state.extended);
    state.credits += refund;
    if state.extended && tower.corruption > 0.0 {
        field.spread(
            tower.coord,
            tower.corruption * SALVAGE_SPILL_SHARE,
            SALVAGE_NEIGHBOR_SHARE,
        );
    }
    debug!(tower = tower_id.0, refund, "tower salvaged");
    events.push(SimEvent::TowerSalvaged { tower_id, refund });
    Ok(refund)
}
