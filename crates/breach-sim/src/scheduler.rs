//! Deferred callbacks owned by the engine.
//!
//! The simulation has exactly two kinds of timer: the spawn timer of the
//! current wave and the auto-start countdown to the next one. Each lives in a
//! single slot, so arming replaces and cancelling is idempotent. Timers are
//! only polled from `SimulationEngine::tick`, so freezing the game (speed 0
//! or game over) leaves them armed.

use breach_core::constants::SPAWN_INTERVAL_MS;

/// Spawn countdown for the active wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTimer {
    /// Enemies this wave is meant to spawn.
    pub quota: u32,
    pub spawned: u32,
    /// Scaled time accumulated toward the next interval (ms).
    pub elapsed_ms: f64,
}

impl SpawnTimer {
    pub fn new(quota: u32) -> Self {
        Self {
            quota,
            spawned: 0,
            elapsed_ms: 0.0,
        }
    }

    pub fn quota_met(&self) -> bool {
        self.spawned >= self.quota
    }

    /// Accumulate scaled time and return how many intervals elapsed.
    pub fn advance(&mut self, scaled_dt_ms: f64) -> u32 {
        self.elapsed_ms += scaled_dt_ms;
        let mut fired = 0;
        while self.elapsed_ms >= SPAWN_INTERVAL_MS {
            self.elapsed_ms -= SPAWN_INTERVAL_MS;
            fired += 1;
        }
        fired
    }
}

/// Wall-clock countdown to an automatic wave start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoStartTimer {
    pub fire_at_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    spawn: Option<SpawnTimer>,
    auto_start: Option<AutoStartTimer>,
}

impl Scheduler {
    pub fn arm_spawn(&mut self, quota: u32) {
        self.spawn = Some(SpawnTimer::new(quota));
    }

    pub fn cancel_spawn(&mut self) {
        self.spawn = None;
    }

    pub fn spawn_armed(&self) -> bool {
        self.spawn.is_some()
    }

    pub fn spawn_timer(&self) -> Option<&SpawnTimer> {
        self.spawn.as_ref()
    }

    /// Take the spawn timer out of its slot while it fires.
    pub fn take_spawn(&mut self) -> Option<SpawnTimer> {
        self.spawn.take()
    }

    /// Return a timer taken with `take_spawn`.
    pub fn restore_spawn(&mut self, timer: SpawnTimer) {
        self.spawn = Some(timer);
    }

    pub fn arm_auto_start(&mut self, fire_at_ms: f64) {
        self.auto_start = Some(AutoStartTimer { fire_at_ms });
    }

    pub fn cancel_auto_start(&mut self) {
        self.auto_start = None;
    }

    pub fn auto_start_armed(&self) -> bool {
        self.auto_start.is_some()
    }

    /// Clear and report the auto-start timer if it is due.
    pub fn take_due_auto_start(&mut self, now_ms: f64) -> bool {
        match self.auto_start {
            Some(timer) if now_ms >= timer.fire_at_ms => {
                self.auto_start = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.spawn = None;
        self.auto_start = None;
    }

    /// Number of armed timers, at most one per kind.
    pub fn armed_count(&self) -> usize {
        usize::from(self.spawn.is_some()) + usize::from(self.auto_start.is_some())
    }
}
