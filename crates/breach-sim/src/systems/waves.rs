//! Wave lifecycle: starting waves, the spawn timer and wave completion.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, trace};

use breach_core::components::Enemy;
use breach_core::constants::*;
use breach_core::enums::*;
use breach_core::error::CommandRejected;
use breach_core::events::SimEvent;
use breach_core::tables::SPAWN_TABLE;

use crate::game_state::GameState;
use crate::paths::PathSet;
use crate::scheduler::Scheduler;
use crate::systems::events::{clear_active, FrameModifiers};
use crate::world_setup::{self, IdAllocator};

/// Enemies a wave is meant to spawn.
pub fn wave_quota(wave: u32, extended: bool) -> u32 {
    let quota = WAVE_BASE_ENEMIES + (f64::from(wave) * WAVE_ENEMIES_PER_WAVE).floor() as u32;
    if extended && wave > LATE_GAME_WAVE {
        quota * 2
    } else {
        quota
    }
}

/// Enemy type for the `spawned`-th spawn of a wave, given a uniform roll in [0, 1).
pub fn pick_enemy_type(wave: u32, spawned: u32, roll: f64) -> EnemyType {
    if wave % BOSS_WAVE_INTERVAL == 0 && spawned == 0 {
        return EnemyType::ZeroDay;
    }
    SPAWN_TABLE
        .iter()
        .find(|rule| wave > rule.after_wave && roll > rule.roll_above)
        .map_or(EnemyType::Packet, |rule| rule.enemy_type)
}

/// Path a new spawn walks, per the difficulty's path policy.
pub fn pick_path(policy: PathPolicy, wave: u32, path_count: usize, rng: &mut ChaCha8Rng) -> usize {
    if path_count < 2 {
        return 0;
    }
    match policy {
        PathPolicy::Primary => 0,
        PathPolicy::Escalating => {
            let chance = (0.1 * (f64::from(wave) - 2.0)).min(0.5);
            if rng.gen::<f64>() < chance {
                1
            } else {
                0
            }
        }
        PathPolicy::Uniform => rng.gen_range(0..path_count),
    }
}

/// Begin the next wave.
pub fn start_wave(
    state: &mut GameState,
    scheduler: &mut Scheduler,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) -> Result<(), CommandRejected> {
    if state.game_over {
        return Err(CommandRejected::GameOver);
    }
    if state.wave_active {
        return Err(CommandRejected::WaveInProgress);
    }
    scheduler.cancel_all();

    state.wave += 1;
    if state.extended && state.wave > WAVE_CAP {
        state.game_over = true;
        info!(wave = state.wave, "wave cap exceeded, game over");
        events.push(SimEvent::GameOver { wave: state.wave });
        return Ok(());
    }

    state.wave_active = true;
    state.wave_start_ms = now_ms;
    let quota = wave_quota(state.wave, state.extended);
    scheduler.arm_spawn(quota);
    info!(wave = state.wave, quota, "wave started");
    events.push(SimEvent::WaveStarted {
        wave: state.wave,
        quota,
    });
    Ok(())
}

/// Advance the spawn timer and spawn whatever fell due.
#[allow(clippy::too_many_arguments)]
pub fn run_spawn_timer(
    world: &mut World,
    scheduler: &mut Scheduler,
    state: &GameState,
    paths: &PathSet,
    mods: &FrameModifiers,
    rng: &mut ChaCha8Rng,
    ids: &mut IdAllocator,
    dt_ms: f64,
    now_ms: f64,
) {
    let Some(mut timer) = scheduler.take_spawn() else {
        return;
    };
    let fired = timer.advance(dt_ms * state.speed);
    for _ in 0..fired {
        if state.game_over || (timer.quota_met() && !mods.unbounded_spawns) {
            return;
        }
        for _ in 0..mods.spawns_per_tick {
            if timer.quota_met() && !mods.unbounded_spawns {
                break;
            }
            if let Some(enemy) = spawn_one(state, paths, mods, rng, ids, timer.spawned) {
                trace!(enemy_type = ?enemy.enemy_type, path = enemy.path_id, "spawn");
                let pos = enemy.pos;
                let mutated = enemy.slow_immune || enemy.aoe_resist;
                world_setup::spawn_enemy(world, enemy);
                if mutated {
                    world_setup::spawn_effect(
                        world,
                        EffectKind::Mutation,
                        pos,
                        HEX_SIZE,
                        now_ms,
                        MUTATION_EFFECT_MS,
                    );
                }
            }
            timer.spawned += 1;
        }
    }
    if state.game_over || (timer.quota_met() && !mods.unbounded_spawns) {
        return;
    }
    scheduler.restore_spawn(timer);
}

fn spawn_one(
    state: &GameState,
    paths: &PathSet,
    mods: &FrameModifiers,
    rng: &mut ChaCha8Rng,
    ids: &mut IdAllocator,
    spawned: u32,
) -> Option<Enemy> {
    let wave = state.wave;
    let difficulty = state.difficulty;
    let enemy_type = pick_enemy_type(wave, spawned, rng.gen::<f64>());
    let path_id = pick_path(difficulty.def().path_policy, wave, paths.len(), rng);
    let mut enemy =
        world_setup::build_enemy(ids.enemy(), enemy_type, wave, difficulty, paths, path_id, 0)?;
    enemy.max_health *= mods.spawn_hp;
    enemy.health = enemy.max_health;
    if mods.mutates_spawns && rng.gen::<f64>() < MUTATION_CHANCE {
        if rng.gen_bool(0.5) {
            enemy.slow_immune = true;
        } else {
            enemy.aoe_resist = true;
        }
    }
    Some(enemy)
}

/// Close the wave once it has fully spawned and the board is clear.
pub fn check_completion(
    world: &mut World,
    scheduler: &mut Scheduler,
    state: &mut GameState,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    if !state.wave_active || scheduler.spawn_armed() {
        return;
    }
    if world.query::<&Enemy>().iter().next().is_some() {
        return;
    }
    state.wave_active = false;
    if let Some(event_type) = clear_active(world, state) {
        events.push(SimEvent::EventEnded { event_type });
    }
    info!(wave = state.wave, "wave cleared");
    events.push(SimEvent::WaveCleared { wave: state.wave });

    if state.auto_start && !state.game_over {
        scheduler.arm_auto_start(now_ms + state.difficulty.def().wave_cooldown_ms);
    }
}
