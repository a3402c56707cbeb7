//! Events emitted by the simulation for UI and audio feedback.
//!
//! Collected during a frame and drained into that frame's snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::hex::HexCoord;
use crate::types::{EnemyId, TowerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    WaveStarted { wave: u32, quota: u32 },
    WaveCleared { wave: u32 },
    EnemyLeaked { enemy_type: EnemyType, damage: f64 },
    EnemyKilled { enemy_id: EnemyId, enemy_type: EnemyType, bounty: f64 },
    EnemySplit { enemy_id: EnemyId, fragments: u32 },
    TowerPlaced { tower_id: TowerId, tower_type: TowerType, coord: HexCoord },
    TowerUpgraded { tower_id: TowerId, level: u8 },
    TowerSalvaged { tower_id: TowerId, refund: f64 },
    TowerDisrupted { tower_id: TowerId, penalty: f64 },
    /// A corrupted tower spawned a hostile fragment.
    TowerBetrayed { tower_id: TowerId },
    EventStarted { event_type: EventType },
    EventEnded { event_type: EventType },
    GameOver { wave: u32 },
}
