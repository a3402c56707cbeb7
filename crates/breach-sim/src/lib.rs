//! Simulation engine for BREACH.
//!
//! Owns the hecs ECS world, runs systems once per frame, applies the
//! placement economy and produces GameStateSnapshots for a frontend.

pub mod economy;
pub mod engine;
pub mod game_state;
pub mod paths;
pub mod scheduler;
pub mod systems;
pub mod world_setup;

pub use breach_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
