//! Error types shared across the workspace.

use std::path::PathBuf;

use thiserror::Error;

use crate::hex::HexCoord;
use crate::types::TowerId;

/// Reason a player command was a no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandRejected {
    #[error("the game is over")]
    GameOver,
    #[error("a wave is already in progress")]
    WaveInProgress,
    #[error("cell {0} is outside the grid")]
    OutOfGrid(HexCoord),
    #[error("cell {0} lies on an active path")]
    OnPath(HexCoord),
    #[error("cell {0} is already occupied")]
    Occupied(HexCoord),
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: f64, available: f64 },
    #[error("no tower with id {0:?}")]
    UnknownTower(TowerId),
    #[error("tower {0:?} is already at max level")]
    MaxLevel(TowerId),
    #[error("upgrades are locked down by an active event")]
    Lockdown,
}

/// Failure to read or parse a simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure to parse a `"q,r"` cell key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHexError {
    #[error("missing ',' separator in {0:?}")]
    MissingSeparator(String),
    #[error("invalid coordinate component {0:?}")]
    InvalidComponent(String),
}
