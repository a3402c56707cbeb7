//! BREACH headless host.
//!
//! Drives the simulation on a dedicated thread at display rate and exposes
//! it through a small control surface: start, send commands, poll the
//! latest snapshot, shut down.

pub mod control;
pub mod game_loop;
pub mod state;

pub use breach_core as core;
