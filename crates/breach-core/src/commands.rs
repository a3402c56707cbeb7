//! Player commands sent from a frontend to the simulation.
//!
//! Commands are queued for processing at the next frame boundary, or applied
//! immediately through `SimulationEngine::execute`.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::hex::HexCoord;
use crate::types::TowerId;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Waves ---
    /// Begin the next wave.
    StartWave,

    // --- Economy ---
    /// Place a new tower on a grid cell.
    PlaceTower {
        tower_type: TowerType,
        coord: HexCoord,
    },
    /// Raise a tower by one level.
    UpgradeTower { tower_id: TowerId },
    /// Remove a tower for a partial refund.
    SalvageTower { tower_id: TowerId },

    // --- Simulation control ---
    /// Set the speed multiplier (clamped to [0, 4]; 0 freezes the game).
    SetSpeed { speed: f64 },
    /// Toggle automatic wave starts.
    ToggleAutoStart,
    /// Toggle god mode (no damage, no costs, no events).
    ToggleGodMode,
    /// Restart from wave 0.
    Reset,
    /// Switch difficulty and restart.
    SelectDifficulty { difficulty: Difficulty },
}
