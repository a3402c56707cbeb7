//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! runs all systems, and produces `GameStateSnapshot`s. Completely headless,
//! so every rule can be exercised from plain tests.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use breach_core::commands::PlayerCommand;
use breach_core::components::Tower;
use breach_core::config::SimConfig;
use breach_core::constants::{MAX_HEALTH, MAX_SPEED};
use breach_core::error::CommandRejected;
use breach_core::events::SimEvent;
use breach_core::hex::{self, HexCoord};
use breach_core::state::GameStateSnapshot;
use breach_core::types::{Point, SimTime, TowerId};

use crate::economy;
use crate::game_state::GameState;
use crate::paths::PathSet;
use crate::scheduler::Scheduler;
use crate::systems;
use crate::systems::contamination::ContaminationField;
use crate::world_setup::{self, IdAllocator};

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    config: SimConfig,
    state: GameState,
    paths: PathSet,
    field: ContaminationField,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    ids: IdAllocator,
    time: SimTime,
    /// Latest timestamp seen, advancing or not.
    clock_ms: f64,
    last_frame_ms: Option<f64>,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    sim_events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            state: GameState::new(&config),
            paths: PathSet::for_difficulty(config.difficulty),
            field: ContaminationField::default(),
            scheduler: Scheduler::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            ids: IdAllocator::default(),
            time: SimTime::default(),
            clock_ms: 0.0,
            last_frame_ms: None,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            sim_events: Vec::new(),
            config,
        }
    }

    /// Queue a player command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Apply a command immediately. A rejected command changes nothing.
    pub fn execute(&mut self, command: PlayerCommand) -> Result<(), CommandRejected> {
        let result = self.handle_command(command.clone());
        if let Err(reason) = &result {
            debug!(?command, %reason, "command rejected");
        }
        result
    }

    /// Advance the simulation to `now_ms` and return the resulting snapshot.
    ///
    /// The elapsed time is measured from the previous call (zero on the
    /// first). Queued commands apply first. While the game is over or the
    /// speed is 0 nothing advances and timers stay armed.
    pub fn tick(&mut self, now_ms: f64) -> GameStateSnapshot {
        let dt_ms = self
            .last_frame_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_ms = Some(now_ms);
        self.clock_ms = now_ms;

        self.process_commands();

        if self.state.is_running() {
            self.run_systems(now_ms, dt_ms);
            self.time.advance(now_ms);
        }

        let events = std::mem::take(&mut self.sim_events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            &self.state,
            &self.paths,
            &self.field,
            events,
        )
    }

    /// Snapshot of the current state without advancing. Pending events are kept.
    pub fn snapshot(&self) -> GameStateSnapshot {
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            &self.state,
            &self.paths,
            &self.field,
            self.sim_events.clone(),
        )
    }

    /// Restart from wave 0 under the configured difficulty, reseeding the
    /// rng and zeroing the frame counter. Queued commands and the wall-clock
    /// frame reference survive; everything else is rebuilt.
    pub fn reset(&mut self) {
        self.world.clear();
        self.state = GameState::new(&self.config);
        self.paths = PathSet::for_difficulty(self.config.difficulty);
        self.field.clear();
        self.scheduler.cancel_all();
        self.ids = IdAllocator::default();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.time = SimTime::default();
        self.despawn_buffer.clear();
        self.sim_events.clear();
        info!(difficulty = ?self.config.difficulty, "simulation reset");
    }

    /// The tower standing on a cell, if any.
    pub fn tower_at(&self, coord: HexCoord) -> Option<TowerId> {
        world_setup::tower_at(&self.world, coord)
    }

    /// The grid cell under a pixel-space point.
    pub fn pixel_to_hex(point: Point) -> HexCoord {
        hex::pixel_to_hex(point.x, point.y)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn contamination(&self) -> &ContaminationField {
        &self.field
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn field_mut(&mut self) -> &mut ContaminationField {
        &mut self.field
    }

    /// Spawn an enemy at the start of a path (for tests).
    #[cfg(test)]
    pub(crate) fn spawn_test_enemy(
        &mut self,
        enemy_type: breach_core::enums::EnemyType,
        path_id: usize,
    ) -> Option<breach_core::types::EnemyId> {
        let enemy = world_setup::build_enemy(
            self.ids.enemy(),
            enemy_type,
            self.state.wave.max(1),
            self.state.difficulty,
            &self.paths,
            path_id,
            0,
        )?;
        let id = enemy.id;
        world_setup::spawn_enemy(&mut self.world, enemy);
        Some(id)
    }

    /// Force an event to start now (for tests).
    #[cfg(test)]
    pub(crate) fn activate_event(&mut self, event_type: breach_core::enums::EventType) {
        systems::events::activate(
            &mut self.world,
            &mut self.state,
            &mut self.rng,
            event_type,
            self.clock_ms,
        );
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            let _ = self.execute(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) -> Result<(), CommandRejected> {
        let now_ms = self.clock_ms;
        match command {
            PlayerCommand::StartWave => systems::waves::start_wave(
                &mut self.state,
                &mut self.scheduler,
                now_ms,
                &mut self.sim_events,
            ),
            PlayerCommand::PlaceTower { tower_type, coord } => economy::place_tower(
                &mut self.world,
                &mut self.state,
                &self.paths,
                &mut self.ids,
                tower_type,
                coord,
                &mut self.sim_events,
            )
            .map(|_| ()),
            PlayerCommand::UpgradeTower { tower_id } => economy::upgrade_tower(
                &mut self.world,
                &mut self.state,
                tower_id,
                now_ms,
                &mut self.sim_events,
            )
            .map(|_| ()),
            PlayerCommand::SalvageTower { tower_id } => economy::salvage_tower(
                &mut self.world,
                &mut self.state,
                &mut self.field,
                tower_id,
                &mut self.sim_events,
            )
            .map(|_| ()),
            PlayerCommand::SetSpeed { speed } => {
                self.state.speed = if speed.is_nan() {
                    0.0
                } else {
                    speed.clamp(0.0, MAX_SPEED)
                };
                debug!(speed = self.state.speed, "speed set");
                Ok(())
            }
            PlayerCommand::ToggleAutoStart => {
                self.state.auto_start = !self.state.auto_start;
                if !self.state.auto_start {
                    self.scheduler.cancel_auto_start();
                } else if !self.state.wave_active
                    && !self.state.game_over
                    && !self.scheduler.auto_start_armed()
                {
                    let cooldown = self.state.difficulty.def().wave_cooldown_ms;
                    self.scheduler.arm_auto_start(now_ms + cooldown);
                }
                debug!(auto_start = self.state.auto_start, "auto-start toggled");
                Ok(())
            }
            PlayerCommand::ToggleGodMode => {
                self.state.god_mode = !self.state.god_mode;
                if self.state.god_mode {
                    self.state.health = MAX_HEALTH;
                    self.state.game_over = false;
                    if let Some(event_type) =
                        systems::events::clear_active(&mut self.world, &mut self.state)
                    {
                        self.sim_events.push(SimEvent::EventEnded { event_type });
                    }
                    for (_entity, tower) in self.world.query_mut::<&mut Tower>() {
                        tower.disrupted_until_ms = 0.0;
                    }
                }
                info!(god_mode = self.state.god_mode, "god mode toggled");
                Ok(())
            }
            PlayerCommand::Reset => {
                self.reset();
                Ok(())
            }
            PlayerCommand::SelectDifficulty { difficulty } => {
                self.config.difficulty = difficulty;
                info!(?difficulty, "difficulty selected");
                self.reset();
                Ok(())
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, now_ms: f64, dt_ms: f64) {
        // 0. Scheduled callbacks
        if self.scheduler.take_due_auto_start(now_ms)
            && self.state.auto_start
            && !self.state.wave_active
        {
            if let Err(reason) = systems::waves::start_wave(
                &mut self.state,
                &mut self.scheduler,
                now_ms,
                &mut self.sim_events,
            ) {
                debug!(%reason, "auto-start skipped");
            }
        }
        let mods = systems::events::modifiers(self.state.active_event.as_ref(), now_ms);
        systems::waves::run_spawn_timer(
            &mut self.world,
            &mut self.scheduler,
            &self.state,
            &self.paths,
            &mods,
            &mut self.rng,
            &mut self.ids,
            dt_ms,
            now_ms,
        );

        // 1. Event lifecycle
        systems::events::run(
            &mut self.world,
            &mut self.state,
            &mut self.rng,
            self.field.global(),
            now_ms,
            &mut self.sim_events,
        );
        let mods = systems::events::modifiers(self.state.active_event.as_ref(), now_ms);

        // 2. Enemy advance
        systems::movement::run(
            &mut self.world,
            &self.paths,
            &mut self.state,
            &mods,
            dt_ms,
            &mut self.despawn_buffer,
            &mut self.sim_events,
        );
        // 3. Tower fire control
        systems::fire_control::run(
            &mut self.world,
            &self.state,
            &mods,
            &mut self.rng,
            &mut self.ids,
            now_ms,
        );
        // 4. Projectile flight and impact
        systems::projectiles::run(
            &mut self.world,
            &self.state,
            dt_ms,
            now_ms,
            &mut self.despawn_buffer,
        );
        // 5. Death resolution
        systems::resolution::run(
            &mut self.world,
            &mut self.state,
            &mods,
            &mut self.rng,
            &mut self.ids,
            now_ms,
            &mut self.despawn_buffer,
            &mut self.sim_events,
        );
        // 6. Wave completion
        systems::waves::check_completion(
            &mut self.world,
            &mut self.scheduler,
            &mut self.state,
            now_ms,
            &mut self.sim_events,
        );
        // 7. Contamination
        if self.state.extended && self.state.wave_active {
            systems::contamination::run(
                &mut self.world,
                &mut self.field,
                &self.state,
                &self.paths,
                &mods,
                &mut self.rng,
                &mut self.ids,
                dt_ms,
                now_ms,
                &mut self.sim_events,
            );
        }
        // 8. Expired effects
        systems::cleanup::run(&mut self.world, now_ms, &mut self.despawn_buffer);
    }
}
