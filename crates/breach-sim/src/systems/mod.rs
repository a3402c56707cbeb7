//! ECS systems that operate on the simulation world each frame.
//!
//! Systems are free functions that take `&mut World` (or `&World` for
//! read-only work). They do not own state: entity state lives in components,
//! scalar state in `GameState`.

pub mod cleanup;
pub mod contamination;
pub mod events;
pub mod fire_control;
pub mod movement;
pub mod projectiles;
pub mod resolution;
pub mod snapshot;
pub mod waves;
