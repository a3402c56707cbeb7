//! Scalar game state: economy, health, wave counter and player toggles.

use breach_core::config::SimConfig;
use breach_core::constants::{MAX_HEALTH, MAX_SPEED};
use breach_core::enums::Difficulty;
use breach_core::state::ActiveEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub credits: f64,
    /// 0..=`MAX_HEALTH`.
    pub health: f64,
    pub wave: u32,
    pub game_over: bool,
    pub wave_active: bool,
    pub difficulty: Difficulty,
    pub extended: bool,
    pub god_mode: bool,
    pub auto_start: bool,
    /// Global speed multiplier, 0..=`MAX_SPEED`.
    pub speed: f64,
    pub active_event: Option<ActiveEvent>,
    /// When the last event ended (ms).
    pub last_event_ms: f64,
    /// When the current wave started (ms).
    pub wave_start_ms: f64,
}

impl GameState {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            credits: config.starting_credits,
            health: MAX_HEALTH,
            wave: 0,
            game_over: false,
            wave_active: false,
            difficulty: config.difficulty,
            extended: config.extended,
            god_mode: false,
            auto_start: false,
            speed: config.time_scale.clamp(0.0, MAX_SPEED),
            active_event: None,
            last_event_ms: 0.0,
            wave_start_ms: 0.0,
        }
    }

    /// Subtract credits, never dropping below zero.
    pub fn charge(&mut self, amount: f64) {
        self.credits = (self.credits - amount).max(0.0);
    }

    /// Apply core damage. Returns true if this damage ended the game.
    pub fn damage_core(&mut self, amount: f64) -> bool {
        if self.god_mode || self.game_over {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, MAX_HEALTH);
        if self.health <= 0.0 {
            self.game_over = true;
            return true;
        }
        false
    }

    /// Whether the world should advance this frame.
    pub fn is_running(&self) -> bool {
        !self.game_over && self.speed > 0.0
    }
}
