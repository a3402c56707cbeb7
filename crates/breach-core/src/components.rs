//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::hex::HexCoord;
use crate::types::{EnemyId, Point, TowerId};

/// A hostile unit walking one of the ingress paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub enemy_type: EnemyType,
    pub pos: Point,
    /// Pixel position of the waypoint the enemy is walking toward.
    pub target_pos: Point,
    pub max_health: f64,
    pub health: f64,
    /// Speed after difficulty scaling, before slows and events.
    pub base_speed: f64,
    /// `SLOW_FACTOR` while the slow timer runs, else exactly 1.0.
    pub slow_multiplier: f64,
    /// Remaining slow (ms of scaled time).
    pub slow_timer_ms: f64,
    /// Index into the engine's path set.
    pub path_id: usize,
    /// Index of the waypoint the current segment starts from.
    pub path_index: usize,
    /// Progress along the current segment, in [0, 1).
    pub progress: f64,
    pub bounty: f64,
    pub is_boss: bool,
    pub is_fragment: bool,
    pub killed_by_splitter: bool,
    pub slow_immune: bool,
    pub aoe_resist: bool,
    pub split_depth: u8,
}

/// A placed tower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: TowerId,
    pub tower_type: TowerType,
    pub coord: HexCoord,
    pub pos: Point,
    /// Timestamp of the last shot; `None` until the first one.
    pub last_fired_ms: Option<f64>,
    /// Cosmetic turret rotation (radians).
    pub rotation: f64,
    /// 1..=`MAX_TOWER_LEVEL`.
    pub level: u8,
    /// The tower is inert until this timestamp.
    pub disrupted_until_ms: f64,
    pub interfered: bool,
    pub patched: bool,
    /// 0..=100, extended variant only.
    pub corruption: f64,
}

/// A shot in flight toward a live enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Point,
    pub target: EnemyId,
    pub damage: f64,
    /// Pixels per scaled second.
    pub speed: f64,
    pub source: TowerType,
    pub slowing: bool,
    /// 0 for single-target shots.
    pub explosion_radius: f64,
    /// Heals instead of damaging (corrupted source tower).
    pub inverted: bool,
}

/// Short-lived presentation effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualEffect {
    pub kind: EffectKind,
    pub pos: Point,
    pub radius: f64,
    pub start_ms: f64,
    pub duration_ms: f64,
}
