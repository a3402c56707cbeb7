//! Fundamental geometric and identity types.

use serde::{Deserialize, Serialize};

/// 2D position in pixel space (hex projection output).
pub type Point = glam::DVec2;

/// Stable identifier of a placed tower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(pub u32);

/// Stable identifier of a live enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Frame-level simulation clock, in wall-clock milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of frames that actually advanced the simulation.
    pub frame: u64,
    /// Timestamp of the most recent frame (ms).
    pub now_ms: f64,
}

impl SimTime {
    /// Record a frame that advanced the simulation.
    pub fn advance(&mut self, now_ms: f64) {
        self.frame += 1;
        self.now_ms = now_ms;
    }
}
