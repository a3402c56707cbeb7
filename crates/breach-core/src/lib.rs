//! Core types and definitions for the BREACH simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! hex geometry, balance tables, components, commands, state snapshots,
//! events, configuration and errors. It has no dependency on any runtime
//! framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod hex;
pub mod state;
pub mod tables;
pub mod types;
