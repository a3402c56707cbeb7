//! Game state snapshot: the complete visible state handed to a frontend each frame.

use serde::{Deserialize, Serialize};

use crate::components::{Tower, VisualEffect};
use crate::enums::*;
use crate::events::SimEvent;
use crate::hex::HexCoord;
use crate::types::{EnemyId, Point, SimTime};

/// The random system event currently in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event_type: EventType,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub name: String,
    pub description: String,
    pub category: EventCategory,
}

impl ActiveEvent {
    /// Instantiate an event from its table definition.
    pub fn new(event_type: EventType, start_ms: f64) -> Self {
        let def = event_type.def();
        Self {
            event_type,
            start_ms,
            duration_ms: def.duration_ms,
            name: def.name.to_string(),
            description: def.description.to_string(),
            category: def.category,
        }
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms > self.duration_ms
    }
}

/// Complete game state broadcast after each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub credits: f64,
    pub health: f64,
    pub wave: u32,
    pub game_over: bool,
    pub wave_active: bool,
    pub speed: f64,
    pub auto_start: bool,
    pub god_mode: bool,
    pub difficulty: Difficulty,
    pub extended: bool,
    /// Sorted by tower id.
    pub towers: Vec<Tower>,
    /// Sorted by enemy id.
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub effects: Vec<VisualEffect>,
    pub active_event: Option<ActiveEvent>,
    /// 0..=100, extended variant only.
    pub global_contamination: f64,
    /// Non-zero cells of the contamination field, sorted by coordinate.
    pub contamination: Vec<CellContamination>,
    /// Paths enemies can currently spawn on.
    pub paths: Vec<Vec<HexCoord>>,
    /// Events raised since the previous snapshot.
    pub events: Vec<SimEvent>,
}

/// A live enemy on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub enemy_type: EnemyType,
    pub pos: Point,
    pub health: f64,
    pub max_health: f64,
    pub is_boss: bool,
    pub is_fragment: bool,
    pub slowed: bool,
    pub slow_immune: bool,
    pub aoe_resist: bool,
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Point,
    pub source: TowerType,
    pub explosive: bool,
    pub inverted: bool,
}

/// Contamination level of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellContamination {
    pub coord: HexCoord,
    pub level: f64,
}
