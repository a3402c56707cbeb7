//! Headless BREACH runner.
//!
//! Plays a scripted opening on a fixed frame clock and prints a summary (or
//! the final snapshot as JSON). With `--realtime` the same script is fed to
//! the threaded game loop instead, paced by the wall clock.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use breach_app::control;
use breach_app::state::AppState;
use breach_core::commands::PlayerCommand;
use breach_core::config::SimConfig;
use breach_core::enums::{Difficulty, TowerType};
use breach_core::events::SimEvent;
use breach_core::hex::HexCoord;
use breach_core::state::GameStateSnapshot;
use breach_sim::SimulationEngine;

/// Frame length of the fixed headless clock (ms).
const HEADLESS_FRAME_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
    Nightmare,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
            DifficultyArg::Nightmare => Difficulty::Nightmare,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless BREACH simulation runner", long_about = None)]
struct Args {
    /// Path to a JSON simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured difficulty
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,

    /// Override the configured RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Enable the extended variant (contamination, hostile events, wave cap)
    #[arg(long)]
    extended: bool,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,

    /// Speed multiplier (0..=4)
    #[arg(long)]
    speed: Option<f64>,

    /// Start with god mode on
    #[arg(long)]
    god_mode: bool,

    /// Drive the threaded game loop in real time instead of a fixed clock
    #[arg(long)]
    realtime: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn build_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty.into();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(speed) = args.speed {
        config.time_scale = speed;
    }
    config.extended |= args.extended;
    config.validate().context("Invalid simulation config")?;
    Ok(config)
}

/// Opening build order followed by continuous waves.
fn opening_script(god_mode: bool) -> Vec<PlayerCommand> {
    let mut script = Vec::new();
    if god_mode {
        script.push(PlayerCommand::ToggleGodMode);
    }
    let placements = [
        (TowerType::Gateway, HexCoord::new(-3, 0)),
        (TowerType::Firewall, HexCoord::new(0, -3)),
        (TowerType::Gateway, HexCoord::new(3, 0)),
        (TowerType::Sandbox, HexCoord::new(5, 3)),
    ];
    script.extend(
        placements
            .into_iter()
            .map(|(tower_type, coord)| PlayerCommand::PlaceTower { tower_type, coord }),
    );
    script.push(PlayerCommand::ToggleAutoStart);
    script.push(PlayerCommand::StartWave);
    script
}

fn run_headless(config: SimConfig, args: &Args) -> Result<GameStateSnapshot> {
    let mut engine = SimulationEngine::new(config);
    for command in opening_script(args.god_mode) {
        if let Err(reason) = engine.execute(command.clone()) {
            warn!(?command, %reason, "scripted command rejected");
        }
    }

    let end_ms = args.seconds * 1000.0;
    let mut now = 0.0;
    let mut snapshot = engine.tick(now);
    while now < end_ms && !snapshot.game_over {
        now += HEADLESS_FRAME_MS;
        snapshot = engine.tick(now);
        for event in &snapshot.events {
            match event {
                SimEvent::WaveCleared { wave } => {
                    info!(wave, credits = snapshot.credits, health = snapshot.health, "wave cleared")
                }
                SimEvent::EventStarted { event_type } => {
                    info!(event = event_type.def().name, "event started")
                }
                SimEvent::GameOver { wave } => info!(wave, "core breached"),
                _ => {}
            }
        }
    }
    Ok(snapshot)
}

fn run_realtime(config: SimConfig, args: &Args) -> Result<GameStateSnapshot> {
    let state = AppState::new(config);
    control::start_simulation(&state)?;
    for command in opening_script(args.god_mode) {
        control::send_command(&state, command)?;
    }
    std::thread::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));
    let snapshot = control::get_snapshot(&state)?;
    control::stop_simulation(&state)?;
    snapshot.context("game loop produced no snapshot")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(
        seed = config.seed,
        difficulty = ?config.difficulty,
        extended = config.extended,
        "BREACH headless runner ready"
    );

    let snapshot = if args.realtime {
        run_realtime(config, &args)?
    } else {
        run_headless(config, &args)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "wave {} | credits {:.0} | health {:.0} | towers {} | enemies {} | contamination {:.1}%{}",
            snapshot.wave,
            snapshot.credits,
            snapshot.health,
            snapshot.towers.len(),
            snapshot.enemies.len(),
            snapshot.global_contamination,
            if snapshot.game_over { " | GAME OVER" } else { "" },
        );
    }
    Ok(())
}
