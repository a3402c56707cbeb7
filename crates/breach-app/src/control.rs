//! Control surface over a running simulation.
//!
//! These calls are what a front end invokes. They bridge requests to the
//! game loop thread through its command channel.

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use breach_core::commands::PlayerCommand;
use breach_core::state::GameStateSnapshot;

use crate::game_loop;
use crate::state::{AppState, GameLoopCommand};

/// Start the simulation. Spawns the game loop thread if not already running.
pub fn start_simulation(state: &AppState) -> Result<()> {
    let mut handle_lock = state
        .loop_handle
        .lock()
        .map_err(|e| anyhow!("loop handle lock poisoned: {e}"))?;
    if handle_lock.is_some() {
        bail!("simulation already running");
    }

    let (cmd_tx, handle) =
        game_loop::spawn_game_loop(state.config.clone(), state.latest_snapshot.clone())
            .context("failed to spawn game loop thread")?;

    let mut tx_lock = state
        .command_tx
        .lock()
        .map_err(|e| anyhow!("command channel lock poisoned: {e}"))?;
    *tx_lock = Some(cmd_tx);
    *handle_lock = Some(handle);
    info!(seed = state.config.seed, difficulty = ?state.config.difficulty, "simulation started");
    Ok(())
}

/// Forward a player command to the simulation.
pub fn send_command(state: &AppState, command: PlayerCommand) -> Result<()> {
    let tx_lock = state
        .command_tx
        .lock()
        .map_err(|e| anyhow!("command channel lock poisoned: {e}"))?;
    match tx_lock.as_ref() {
        Some(tx) => tx
            .send(GameLoopCommand::PlayerCommand(command))
            .context("game loop is no longer receiving commands"),
        None => bail!("simulation not started"),
    }
}

/// The latest snapshot, if the loop has produced one.
pub fn get_snapshot(state: &AppState) -> Result<Option<GameStateSnapshot>> {
    let lock = state
        .latest_snapshot
        .lock()
        .map_err(|e| anyhow!("snapshot lock poisoned: {e}"))?;
    Ok(lock.clone())
}

/// Stop the game loop and wait for its thread to exit.
pub fn stop_simulation(state: &AppState) -> Result<()> {
    let tx = state
        .command_tx
        .lock()
        .map_err(|e| anyhow!("command channel lock poisoned: {e}"))?
        .take();
    if let Some(tx) = tx {
        // A disconnected channel stops the loop just as well.
        let _ = tx.send(GameLoopCommand::Shutdown);
    }
    let handle = state
        .loop_handle
        .lock()
        .map_err(|e| anyhow!("loop handle lock poisoned: {e}"))?
        .take();
    if let Some(handle) = handle {
        handle
            .join()
            .map_err(|_| anyhow!("game loop thread panicked"))?;
        info!("simulation stopped");
    }
    Ok(())
}
