//! Tests for the simulation engine: economy, waves, events, combat and contamination.

use std::collections::HashSet;

use breach_core::commands::PlayerCommand;
use breach_core::components::{Enemy, Projectile, Tower};
use breach_core::config::SimConfig;
use breach_core::constants::*;
use breach_core::enums::*;
use breach_core::error::CommandRejected;
use breach_core::events::SimEvent;
use breach_core::hex::HexCoord;
use breach_core::state::GameStateSnapshot;
use breach_core::types::{EnemyId, Point, TowerId};

use crate::engine::SimulationEngine;
use crate::systems::events::candidates;
use crate::world_setup;

const FRAME_MS: f64 = 16.0;

fn engine_with(config: SimConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(config);
    engine.tick(0.0);
    engine
}

fn rich_config() -> SimConfig {
    SimConfig {
        starting_credits: 10_000.0,
        ..Default::default()
    }
}

/// Tick in `step_ms` increments from `*now` up to `until`.
fn run_until(
    engine: &mut SimulationEngine,
    now: &mut f64,
    until: f64,
    step_ms: f64,
) -> Vec<GameStateSnapshot> {
    let mut snapshots = Vec::new();
    while *now + step_ms <= until {
        *now += step_ms;
        snapshots.push(engine.tick(*now));
    }
    snapshots
}

fn enemy(engine: &SimulationEngine, id: EnemyId) -> Enemy {
    engine
        .world()
        .query::<&Enemy>()
        .iter()
        .find(|(_, e)| e.id == id)
        .map(|(_, e)| e.clone())
        .expect("enemy should exist")
}

fn edit_enemy(engine: &mut SimulationEngine, id: EnemyId, f: impl Fn(&mut Enemy)) {
    for (_entity, e) in engine.world_mut().query_mut::<&mut Enemy>() {
        if e.id == id {
            f(e);
        }
    }
}

fn tower(engine: &SimulationEngine, id: TowerId) -> Tower {
    engine
        .world()
        .query::<&Tower>()
        .iter()
        .find(|(_, t)| t.id == id)
        .map(|(_, t)| t.clone())
        .expect("tower should exist")
}

fn place(engine: &mut SimulationEngine, tower_type: TowerType, q: i32, r: i32) -> TowerId {
    let coord = HexCoord::new(q, r);
    engine
        .execute(PlayerCommand::PlaceTower { tower_type, coord })
        .expect("placement should succeed");
    engine.tower_at(coord).expect("tower should be on the cell")
}

fn walked(e: &Enemy) -> f64 {
    e.path_index as f64 + e.progress
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut a = engine_with(SimConfig { seed: 12345, ..rich_config() });
    let mut b = engine_with(SimConfig { seed: 12345, ..rich_config() });
    for engine in [&mut a, &mut b] {
        place(engine, TowerType::Firewall, -3, 0);
        place(engine, TowerType::ProxyServer, 0, -3);
        engine.queue_command(PlayerCommand::ToggleAutoStart);
        engine.queue_command(PlayerCommand::StartWave);
    }
    let mut now = 0.0;
    for _ in 0..1500 {
        now += FRAME_MS;
        let json_a = serde_json::to_string(&a.tick(now)).unwrap();
        let json_b = serde_json::to_string(&b.tick(now)).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

// ---- Economy ----

#[test]
fn test_place_tower_deducts_cost() {
    let mut engine = engine_with(SimConfig::default());
    let id = place(&mut engine, TowerType::Firewall, 0, 0);
    assert_eq!(engine.state().credits, 150.0);

    let snap = engine.tick(FRAME_MS);
    assert_eq!(snap.towers.len(), 1);
    assert_eq!(snap.towers[0].id, id);
    assert_eq!(snap.towers[0].level, 1);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::TowerPlaced { tower_id, .. } if *tower_id == id)));
}

#[test]
fn test_place_tower_rejections() {
    let mut engine = engine_with(SimConfig::default());
    let on_path = HexCoord::new(-12, 0);
    assert_eq!(
        engine.execute(PlayerCommand::PlaceTower {
            tower_type: TowerType::Gateway,
            coord: on_path,
        }),
        Err(CommandRejected::OnPath(on_path))
    );
    let outside = HexCoord::new(20, 0);
    assert_eq!(
        engine.execute(PlayerCommand::PlaceTower {
            tower_type: TowerType::Gateway,
            coord: outside,
        }),
        Err(CommandRejected::OutOfGrid(outside))
    );
    assert!(matches!(
        engine.execute(PlayerCommand::PlaceTower {
            tower_type: TowerType::QuantumCore,
            coord: HexCoord::new(0, 0),
        }),
        Err(CommandRejected::InsufficientCredits { .. })
    ));

    place(&mut engine, TowerType::Gateway, 0, 0);
    assert_eq!(
        engine.execute(PlayerCommand::PlaceTower {
            tower_type: TowerType::Gateway,
            coord: HexCoord::new(0, 0),
        }),
        Err(CommandRejected::Occupied(HexCoord::new(0, 0)))
    );
    // Rejections never charge.
    assert_eq!(engine.state().credits, 210.0);
}

#[test]
fn test_flank_cells_open_on_single_path_difficulty() {
    let mut engine = engine_with(SimConfig::default());
    // (-10, -2) lies on the lateral flank, which Normal does not use.
    place(&mut engine, TowerType::Gateway, -10, -2);

    let mut hard = engine_with(SimConfig {
        difficulty: Difficulty::Hard,
        ..Default::default()
    });
    assert!(matches!(
        hard.execute(PlayerCommand::PlaceTower {
            tower_type: TowerType::Gateway,
            coord: HexCoord::new(-10, -2),
        }),
        Err(CommandRejected::OnPath(_))
    ));
}

#[test]
fn test_upgrade_level_bounds() {
    let mut engine = engine_with(rich_config());
    let id = place(&mut engine, TowerType::Firewall, 0, 0);

    assert_eq!(engine.execute(PlayerCommand::UpgradeTower { tower_id: id }), Ok(()));
    assert_eq!(engine.execute(PlayerCommand::UpgradeTower { tower_id: id }), Ok(()));
    assert_eq!(tower(&engine, id).level, MAX_TOWER_LEVEL);
    assert_eq!(
        engine.execute(PlayerCommand::UpgradeTower { tower_id: id }),
        Err(CommandRejected::MaxLevel(id))
    );
    assert_eq!(tower(&engine, id).level, MAX_TOWER_LEVEL);
    // 100 placement + 200 + 300 upgrades.
    assert_eq!(engine.state().credits, 10_000.0 - 600.0);
}

#[test]
fn test_unknown_tower_rejected() {
    let mut engine = engine_with(SimConfig::default());
    let ghost = TowerId(99);
    assert_eq!(
        engine.execute(PlayerCommand::UpgradeTower { tower_id: ghost }),
        Err(CommandRejected::UnknownTower(ghost))
    );
    assert_eq!(
        engine.execute(PlayerCommand::SalvageTower { tower_id: ghost }),
        Err(CommandRejected::UnknownTower(ghost))
    );
}

#[test]
fn test_salvage_refund() {
    let mut engine = engine_with(rich_config());
    let id = place(&mut engine, TowerType::Firewall, 0, 0);
    engine.execute(PlayerCommand::UpgradeTower { tower_id: id }).unwrap();
    engine.execute(PlayerCommand::UpgradeTower { tower_id: id }).unwrap();
    let before = engine.state().credits;

    engine.execute(PlayerCommand::SalvageTower { tower_id: id }).unwrap();
    assert_eq!(engine.state().credits - before, 450.0);
    assert_eq!(engine.tower_at(HexCoord::new(0, 0)), None);
}

#[test]
fn test_god_mode_places_for_free() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::ToggleGodMode).unwrap();
    place(&mut engine, TowerType::QuantumCore, 0, 0);
    assert_eq!(engine.state().credits, STARTING_CREDITS);
}

#[test]
fn test_exact_displayed_price_is_affordable() {
    for difficulty in [Difficulty::Hard, Difficulty::Nightmare] {
        let price = crate::economy::placement_cost(TowerType::Firewall, difficulty);
        let mut engine = engine_with(SimConfig {
            difficulty,
            starting_credits: price,
            ..Default::default()
        });
        assert_eq!(price, (price * 100.0).round() / 100.0);
        place(&mut engine, TowerType::Firewall, 0, 0);
        assert_eq!(engine.state().credits, 0.0);
    }
    assert_eq!(
        crate::economy::placement_cost(TowerType::Firewall, Difficulty::Hard),
        110.0
    );
}

// ---- Queries ----

#[test]
fn test_click_resolves_to_tower() {
    let mut engine = engine_with(SimConfig::default());
    let id = place(&mut engine, TowerType::Gateway, 3, -2);
    let click = HexCoord::new(3, -2).to_pixel() + Point::new(5.0, -5.0);
    let cell = SimulationEngine::pixel_to_hex(click);
    assert_eq!(cell, HexCoord::new(3, -2));
    assert_eq!(engine.tower_at(cell), Some(id));
}

// ---- Enemy movement ----

#[test]
fn test_slow_halves_speed_then_restores() {
    let mut engine = engine_with(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyType::Packet, 0).unwrap();
    edit_enemy(&mut engine, id, |e| e.slow_timer_ms = SLOW_DURATION_MS);

    let mut now = 0.0;
    run_until(&mut engine, &mut now, 100.0, 100.0);
    let e = enemy(&engine, id);
    assert_eq!(e.slow_multiplier, SLOW_FACTOR);
    // 0.02 speed · 0.5 slow · 5 · (100 ms / reference frame)
    assert!((walked(&e) - 0.3).abs() < 1e-9, "walked {}", walked(&e));

    run_until(&mut engine, &mut now, 2000.0, 100.0);
    let e = enemy(&engine, id);
    assert_eq!(e.slow_timer_ms, 0.0);
    let before = walked(&e);

    run_until(&mut engine, &mut now, 2100.0, 100.0);
    let e = enemy(&engine, id);
    assert_eq!(e.slow_multiplier, 1.0);
    assert!((walked(&e) - before - 0.6).abs() < 1e-9);
}

#[test]
fn test_slow_immune_enemy_ignores_slowing_shots() {
    let mut engine = engine_with(rich_config());
    place(&mut engine, TowerType::Sandbox, -11, 1);
    let id = engine.spawn_test_enemy(EnemyType::Trojan, 0).unwrap();
    edit_enemy(&mut engine, id, |e| e.slow_immune = true);

    let mut now = 0.0;
    run_until(&mut engine, &mut now, 1000.0, FRAME_MS);
    let e = enemy(&engine, id);
    assert!(e.health < e.max_health, "sandbox should have hit");
    assert_eq!(e.slow_timer_ms, 0.0);
}

#[test]
fn test_leak_costs_health() {
    let mut engine = engine_with(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyType::Packet, 0).unwrap();
    move_to_last_segment(&mut engine, id);

    let snap = engine.tick(100.0);
    assert_eq!(snap.health, MAX_HEALTH - LEAK_DAMAGE);
    assert!(snap.enemies.is_empty());
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::EnemyLeaked { .. })));
}

#[test]
fn test_boss_leak_costs_fifty() {
    let mut engine = engine_with(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyType::ZeroDay, 0).unwrap();
    move_to_last_segment(&mut engine, id);
    edit_enemy(&mut engine, id, |e| e.progress = 0.9999);

    let snap = engine.tick(100.0);
    assert_eq!(snap.health, MAX_HEALTH - BOSS_LEAK_DAMAGE);
}

fn move_to_last_segment(engine: &mut SimulationEngine, id: EnemyId) {
    let count = engine.paths().waypoint_count(0);
    let start = engine.paths().waypoint(0, count - 2).unwrap();
    let end = engine.paths().waypoint(0, count - 1).unwrap();
    edit_enemy(engine, id, |e| {
        e.path_index = count - 2;
        e.progress = 0.99;
        e.pos = start;
        e.target_pos = end;
    });
}

// ---- Game over ----

#[test]
fn test_game_over_halts_simulation() {
    let mut engine = engine_with(SimConfig::default());
    engine.state_mut().health = 5.0;
    let id = engine.spawn_test_enemy(EnemyType::Packet, 0).unwrap();
    move_to_last_segment(&mut engine, id);
    let survivor = engine.spawn_test_enemy(EnemyType::Trojan, 0).unwrap();

    let snap = engine.tick(100.0);
    assert!(snap.game_over);
    assert_eq!(snap.health, 0.0);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::GameOver { .. })));

    let frame = engine.time().frame;
    let frozen = enemy(&engine, survivor);
    let mut now = 100.0;
    run_until(&mut engine, &mut now, 2000.0, 100.0);
    assert_eq!(engine.time().frame, frame);
    assert_eq!(walked(&enemy(&engine, survivor)), walked(&frozen));

    assert_eq!(
        engine.execute(PlayerCommand::StartWave),
        Err(CommandRejected::GameOver)
    );
    assert!(matches!(
        engine.execute(PlayerCommand::PlaceTower {
            tower_type: TowerType::Gateway,
            coord: HexCoord::new(0, 0),
        }),
        Err(CommandRejected::GameOver)
    ));
}

#[test]
fn test_god_mode_restores_core() {
    let mut engine = engine_with(SimConfig::default());
    let id = place(&mut engine, TowerType::Gateway, 0, 0);
    engine.state_mut().health = 0.0;
    engine.state_mut().game_over = true;
    for (_entity, t) in engine.world_mut().query_mut::<&mut Tower>() {
        t.disrupted_until_ms = 1e9;
    }

    engine.execute(PlayerCommand::ToggleGodMode).unwrap();
    assert_eq!(engine.state().health, MAX_HEALTH);
    assert!(!engine.state().game_over);
    assert_eq!(tower(&engine, id).disrupted_until_ms, 0.0);
}

// ---- Reset ----

#[test]
fn test_reset_is_idempotent() {
    let mut engine = engine_with(SimConfig::default());
    place(&mut engine, TowerType::Firewall, 0, 0);
    engine.execute(PlayerCommand::StartWave).unwrap();
    let mut now = 0.0;
    run_until(&mut engine, &mut now, 3000.0, FRAME_MS);

    engine.execute(PlayerCommand::Reset).unwrap();
    let first = serde_json::to_string(&engine.snapshot()).unwrap();
    engine.execute(PlayerCommand::Reset).unwrap();
    let second = serde_json::to_string(&engine.snapshot()).unwrap();
    assert_eq!(first, second);

    let state = engine.state();
    assert_eq!(state.credits, STARTING_CREDITS);
    assert_eq!(state.wave, 0);
    assert!(!state.wave_active);
    assert_eq!(engine.scheduler().armed_count(), 0);
    assert_eq!(engine.world().len(), 0);
}

#[test]
fn test_select_difficulty_resets_and_switches_paths() {
    let mut engine = engine_with(SimConfig::default());
    place(&mut engine, TowerType::Gateway, 0, 0);
    engine
        .execute(PlayerCommand::SelectDifficulty {
            difficulty: Difficulty::Nightmare,
        })
        .unwrap();
    assert_eq!(engine.state().difficulty, Difficulty::Nightmare);
    assert_eq!(engine.paths().len(), 2);
    assert_eq!(engine.tower_at(HexCoord::new(0, 0)), None);
    assert_eq!(engine.state().credits, STARTING_CREDITS);
}

#[test]
fn test_reset_restores_clock_and_rng() {
    let config = SimConfig { seed: 99, ..Default::default() };
    let mut reused = engine_with(config.clone());
    reused.execute(PlayerCommand::StartWave).unwrap();
    let mut now = 0.0;
    run_until(&mut reused, &mut now, 3000.0, 100.0);
    assert!(reused.time().frame > 0);
    reused.execute(PlayerCommand::Reset).unwrap();
    assert_eq!(reused.time().frame, 0);
    assert_eq!(reused.snapshot().time.frame, 0);

    // An idle engine at the same wall clock has drawn nothing from its rng.
    let mut fresh = engine_with(config);
    fresh.tick(3000.0);

    for engine in [&mut reused, &mut fresh] {
        engine.execute(PlayerCommand::StartWave).unwrap();
    }
    let (mut now_a, mut now_b) = (3000.0, 3000.0);
    let a = run_until(&mut reused, &mut now_a, 15_000.0, 100.0);
    let b = run_until(&mut fresh, &mut now_b, 15_000.0, 100.0);
    for (snap_a, snap_b) in a.iter().zip(&b) {
        assert_eq!(
            serde_json::to_string(&snap_a.enemies).unwrap(),
            serde_json::to_string(&snap_b.enemies).unwrap()
        );
        assert_eq!(snap_a.events, snap_b.events);
    }
}

// ---- Waves ----

#[test]
fn test_tenth_wave_opens_with_boss() {
    for (wave, expect_boss) in [(9, false), (10, true), (11, false)] {
        let mut engine = engine_with(SimConfig::default());
        engine.state_mut().wave = wave - 1;
        engine.execute(PlayerCommand::StartWave).unwrap();
        let snap = engine.tick(SPAWN_INTERVAL_MS);
        assert_eq!(snap.wave, wave);
        assert_eq!(snap.enemies.len(), 1);
        let first = &snap.enemies[0];
        assert_eq!(first.enemy_type == EnemyType::ZeroDay, expect_boss, "wave {wave}");
        assert_eq!(first.is_boss, expect_boss);
    }
}

#[test]
fn test_second_start_rejected_while_active() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::StartWave).unwrap();
    assert_eq!(
        engine.execute(PlayerCommand::StartWave),
        Err(CommandRejected::WaveInProgress)
    );
    assert_eq!(engine.state().wave, 1);
    assert_eq!(engine.scheduler().spawn_timer().map(|t| t.quota), Some(9));
}

#[test]
fn test_wave_runs_to_completion() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::StartWave).unwrap();

    let mut now = 0.0;
    let snapshots = run_until(&mut engine, &mut now, 19_000.0, FRAME_MS);
    let cleared = snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .any(|e| *e == SimEvent::WaveCleared { wave: 1 });
    assert!(cleared);

    let last = snapshots.last().unwrap();
    assert!(!last.wave_active);
    assert_eq!(last.health, MAX_HEALTH - 9.0 * LEAK_DAMAGE);
    assert!(!engine.scheduler().spawn_armed());
}

#[test]
fn test_at_most_one_spawn_timer() {
    let mut engine = engine_with(rich_config());
    place(&mut engine, TowerType::Firewall, -3, 0);
    place(&mut engine, TowerType::Firewall, 0, -3);
    engine.execute(PlayerCommand::ToggleAutoStart).unwrap();
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.execute(PlayerCommand::SetSpeed { speed: 4.0 }).unwrap();

    let mut now = 0.0;
    let mut idle_frames = 0;
    while now < 60_000.0 {
        now += FRAME_MS;
        let snap = engine.tick(now);
        assert!(engine.scheduler().armed_count() <= 2);
        if !snap.wave_active {
            idle_frames += 1;
            assert!(!engine.scheduler().spawn_armed(), "spawn timer armed between waves");
        }
    }
    assert!(idle_frames > 0);
    assert!(engine.state().wave > 1);
}

#[test]
fn test_auto_start_after_cooldown() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::ToggleAutoStart).unwrap();
    assert!(engine.scheduler().auto_start_armed());

    engine.tick(3_990.0);
    assert_eq!(engine.state().wave, 0);
    engine.tick(4_000.0);
    assert_eq!(engine.state().wave, 1);
    assert!(engine.state().wave_active);

    engine.execute(PlayerCommand::ToggleAutoStart).unwrap();
    assert!(!engine.scheduler().auto_start_armed());
}

#[test]
fn test_speed_zero_freezes_timers() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.execute(PlayerCommand::SetSpeed { speed: 0.0 }).unwrap();

    let mut now = 0.0;
    run_until(&mut engine, &mut now, 5_000.0, 100.0);
    assert!(engine.snapshot().enemies.is_empty());
    assert!(engine.scheduler().spawn_armed());

    engine.execute(PlayerCommand::SetSpeed { speed: 1.0 }).unwrap();
    run_until(&mut engine, &mut now, 5_000.0 + SPAWN_INTERVAL_MS, 100.0);
    assert_eq!(engine.snapshot().enemies.len(), 1);
}

#[test]
fn test_speed_clamped() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::SetSpeed { speed: 9.0 }).unwrap();
    assert_eq!(engine.state().speed, MAX_SPEED);
    engine.execute(PlayerCommand::SetSpeed { speed: -1.0 }).unwrap();
    assert_eq!(engine.state().speed, 0.0);
}

// ---- Combat ----

#[test]
fn test_tower_kills_packet() {
    let mut engine = engine_with(SimConfig::default());
    place(&mut engine, TowerType::Firewall, -11, 1);
    engine.spawn_test_enemy(EnemyType::Packet, 0).unwrap();

    let mut now = 0.0;
    let snapshots = run_until(&mut engine, &mut now, 1000.0, FRAME_MS);
    assert!(snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .any(|e| matches!(e, SimEvent::EnemyKilled { enemy_type: EnemyType::Packet, .. })));
    assert!(engine.snapshot().enemies.is_empty());
    assert_eq!(engine.state().credits, 150.0 + 8.0);
}

#[test]
fn test_dangling_projectile_discarded() {
    let mut engine = engine_with(SimConfig::default());
    world_setup::spawn_projectile(
        engine.world_mut(),
        Projectile {
            id: 1,
            pos: Point::ZERO,
            target: EnemyId(999),
            damage: 50.0,
            speed: PROJECTILE_SPEED,
            source: TowerType::Firewall,
            slowing: false,
            explosion_radius: 0.0,
            inverted: false,
        },
    );
    let snap = engine.tick(FRAME_MS);
    assert!(snap.projectiles.is_empty());
}

#[test]
fn test_logic_bomb_disrupts_and_charges() {
    let mut engine = engine_with(SimConfig::default());
    let tower_id = place(&mut engine, TowerType::Firewall, 0, 0);
    let tower_pos = tower(&engine, tower_id).pos;
    let bomb = engine.spawn_test_enemy(EnemyType::LogicBomb, 0).unwrap();
    edit_enemy(&mut engine, bomb, |e| {
        e.pos = tower_pos;
        e.target_pos = tower_pos;
        e.health = 0.0;
    });

    let snap = engine.tick(FRAME_MS);
    // 150 left after placement, +150 bounty, -10 repair.
    assert_eq!(snap.credits, 290.0);
    assert_eq!(
        tower(&engine, tower_id).disrupted_until_ms,
        FRAME_MS + DISRUPTION_DURATION_MS
    );
    assert!(snap
        .effects
        .iter()
        .any(|fx| fx.kind == EffectKind::Disruption));
}

#[test]
fn test_disruption_penalty_clamps_credits() {
    let mut engine = engine_with(SimConfig::default());
    let tower_id = place(&mut engine, TowerType::Firewall, 0, 0);
    let tower_pos = tower(&engine, tower_id).pos;
    engine.state_mut().credits = 0.0;
    let bomb = engine.spawn_test_enemy(EnemyType::LogicBomb, 0).unwrap();
    edit_enemy(&mut engine, bomb, |e| {
        e.pos = tower_pos;
        e.target_pos = tower_pos;
        e.health = 0.0;
        e.bounty = 0.0;
    });
    let snap = engine.tick(FRAME_MS);
    assert_eq!(snap.credits, 0.0);
}

#[test]
fn test_splitter_kill_spawns_fragments() {
    let mut engine = engine_with(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyType::Virus, 0).unwrap();
    edit_enemy(&mut engine, id, |e| {
        e.target_pos = e.pos;
        e.health = 0.0;
        e.killed_by_splitter = true;
    });

    let snap = engine.tick(FRAME_MS);
    assert!((2..=3).contains(&snap.enemies.len()));
    for fragment in &snap.enemies {
        assert!(fragment.is_fragment);
        assert!((fragment.max_health - 60.0 * FRAGMENT_HP_FACTOR).abs() < 1e-9);
    }
    let fragment = enemy(&engine, snap.enemies[0].id);
    assert_eq!(fragment.split_depth, 1);
    assert_eq!(fragment.bounty, 4.0);
    assert!((fragment.base_speed - 0.012 * FRAGMENT_SPEED_FACTOR).abs() < 1e-12);
}

#[test]
fn test_fragments_never_resplit() {
    let mut engine = engine_with(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyType::Fragment, 0).unwrap();
    edit_enemy(&mut engine, id, |e| {
        e.target_pos = e.pos;
        e.health = 0.0;
        e.killed_by_splitter = true;
    });
    let snap = engine.tick(FRAME_MS);
    assert!(snap.enemies.is_empty());
}

#[test]
fn test_invariants_hold_through_a_long_game() {
    let mut engine = engine_with(SimConfig {
        seed: 7,
        ..rich_config()
    });
    place(&mut engine, TowerType::DemolitionNode, -3, 0);
    place(&mut engine, TowerType::ProxyServer, 0, -3);
    place(&mut engine, TowerType::Sandbox, 3, 0);
    place(&mut engine, TowerType::Firewall, 5, 3);
    engine.execute(PlayerCommand::ToggleAutoStart).unwrap();
    engine.execute(PlayerCommand::SetSpeed { speed: 4.0 }).unwrap();

    let mut now = 0.0;
    for snap in run_until(&mut engine, &mut now, 90_000.0, FRAME_MS) {
        assert!(snap.credits >= 0.0);
        assert!((0.0..=MAX_HEALTH).contains(&snap.health));
        assert!(snap.enemies.iter().all(|e| e.health > 0.0));
        assert!(snap.enemies.iter().all(|e| e.health <= e.max_health));
        let coords: HashSet<HexCoord> = snap.towers.iter().map(|t| t.coord).collect();
        assert_eq!(coords.len(), snap.towers.len());
        assert!(snap
            .towers
            .iter()
            .all(|t| (1..=MAX_TOWER_LEVEL).contains(&t.level)));
    }
    assert!(engine.state().wave > 1);
}

/// Put an enemy at `pos` and keep it there.
fn pin_enemy(engine: &mut SimulationEngine, enemy_type: EnemyType, pos: Point) -> EnemyId {
    let id = engine.spawn_test_enemy(enemy_type, 0).unwrap();
    edit_enemy(engine, id, |e| {
        e.pos = pos;
        e.target_pos = pos;
    });
    id
}

fn shot_at(id: u32, target: EnemyId, pos: Point) -> Projectile {
    Projectile {
        id,
        pos,
        target,
        damage: 75.0,
        speed: PROJECTILE_SPEED,
        source: TowerType::Firewall,
        slowing: false,
        explosion_radius: 0.0,
        inverted: false,
    }
}

#[test]
fn test_inverted_shot_heals_up_to_max() {
    let mut engine = engine_with(SimConfig::default());
    let origin = HexCoord::new(0, 0).to_pixel();
    let id = pin_enemy(&mut engine, EnemyType::Trojan, origin);
    edit_enemy(&mut engine, id, |e| e.health = e.max_health - 10.0);
    world_setup::spawn_projectile(
        engine.world_mut(),
        Projectile {
            slowing: true,
            inverted: true,
            ..shot_at(1, id, origin)
        },
    );

    let snap = engine.tick(FRAME_MS);
    assert!(snap.projectiles.is_empty());
    let e = enemy(&engine, id);
    assert_eq!(e.health, e.max_health);
    // Inverted slowing shots do not slow.
    assert_eq!(e.slow_timer_ms, 0.0);

    edit_enemy(&mut engine, id, |e| e.health = 100.0);
    world_setup::spawn_projectile(
        engine.world_mut(),
        Projectile {
            inverted: true,
            ..shot_at(2, id, origin)
        },
    );
    engine.tick(2.0 * FRAME_MS);
    assert_eq!(enemy(&engine, id).health, 100.0 + 75.0 * INVERTED_HEAL_FACTOR);
}

#[test]
fn test_explosion_falls_off_and_respects_aoe_resist() {
    let mut engine = engine_with(SimConfig::default());
    let centre = HexCoord::new(0, 0).to_pixel();
    let direct = pin_enemy(&mut engine, EnemyType::Trojan, centre);
    let near = pin_enemy(&mut engine, EnemyType::Trojan, centre + Point::new(50.0, 0.0));
    let resistant = pin_enemy(&mut engine, EnemyType::Trojan, centre + Point::new(0.0, 50.0));
    edit_enemy(&mut engine, resistant, |e| e.aoe_resist = true);
    let outside = pin_enemy(&mut engine, EnemyType::Trojan, centre + Point::new(150.0, 0.0));
    world_setup::spawn_projectile(
        engine.world_mut(),
        Projectile {
            damage: 400.0,
            speed: EXPLOSIVE_PROJECTILE_SPEED,
            source: TowerType::DemolitionNode,
            explosion_radius: 100.0,
            ..shot_at(1, direct, centre)
        },
    );

    let snap = engine.tick(FRAME_MS);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::EnemyKilled { enemy_id, .. } if *enemy_id == direct)));
    assert!(snap.effects.iter().any(|fx| fx.kind == EffectKind::Explosion));

    let near = enemy(&engine, near);
    assert!((near.max_health - near.health - 200.0).abs() < 1e-6);
    let resistant = enemy(&engine, resistant);
    assert!((resistant.max_health - resistant.health - 100.0).abs() < 1e-6);
    let outside = enemy(&engine, outside);
    assert_eq!(outside.health, outside.max_health);
}

// ---- Events ----

#[test]
fn test_event_rolls_after_grace_from_difficulty_pool() {
    let mut engine = engine_with(SimConfig {
        difficulty: Difficulty::Easy,
        ..Default::default()
    });
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.state_mut().last_event_ms = -1e9;

    let mut now = 0.0;
    run_until(&mut engine, &mut now, EVENT_GRACE_MS - 100.0, 100.0);
    assert!(engine.state().active_event.is_none());

    run_until(&mut engine, &mut now, EVENT_GRACE_MS + 100.0, 100.0);
    let event = engine.state().active_event.clone().expect("event should roll");
    assert!(matches!(
        event.category,
        EventCategory::Good | EventCategory::Neutral
    ));
}

#[test]
fn test_god_mode_suppresses_events() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::ToggleGodMode).unwrap();
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.state_mut().last_event_ms = -1e9;

    let mut now = 0.0;
    run_until(&mut engine, &mut now, 15_000.0, 100.0);
    assert!(engine.state().active_event.is_none());
}

#[test]
fn test_interference_marks_and_expiry() {
    let mut engine = engine_with(rich_config());
    place(&mut engine, TowerType::Gateway, 0, 0);
    place(&mut engine, TowerType::Gateway, 1, 0);
    place(&mut engine, TowerType::Gateway, 2, 0);
    engine.activate_event(EventType::TowerInterference);

    let marked = |engine: &SimulationEngine| {
        engine
            .world()
            .query::<&Tower>()
            .iter()
            .filter(|(_, t)| t.interfered)
            .count()
    };
    // ceil(3 · 0.35)
    assert_eq!(marked(&engine), 2);

    let snap = engine.tick(7_001.0);
    assert!(snap.active_event.is_none());
    assert_eq!(marked(&engine), 0);
    assert_eq!(engine.state().last_event_ms, 7_001.0);
    assert!(snap.events.contains(&SimEvent::EventEnded {
        event_type: EventType::TowerInterference
    }));
}

#[test]
fn test_packet_flood_spawns_three_weakened() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.activate_event(EventType::PacketFlood);

    let snap = engine.tick(SPAWN_INTERVAL_MS);
    assert_eq!(snap.enemies.len(), 3);
    for e in &snap.enemies {
        assert!((e.max_health - 20.0 * 0.7).abs() < 1e-9);
    }
}

#[test]
fn test_quarantine_locks_upgrades() {
    let mut engine = engine_with(rich_config());
    let id = place(&mut engine, TowerType::Gateway, 0, 0);
    engine.activate_event(EventType::Quarantine);
    assert_eq!(
        engine.execute(PlayerCommand::UpgradeTower { tower_id: id }),
        Err(CommandRejected::Lockdown)
    );
    assert_eq!(tower(&engine, id).level, 1);
}

#[test]
fn test_hostile_events_only_in_extended() {
    let base = engine_with(SimConfig::default());
    assert!(!candidates(base.state()).contains(&EventType::CorruptionSurge));

    let extended = engine_with(SimConfig {
        extended: true,
        ..Default::default()
    });
    let pool = candidates(extended.state());
    assert!(pool.contains(&EventType::CorruptionSurge));
    assert!(pool.contains(&EventType::Quarantine));
}

/// A Gateway at the origin with a pinned Trojan `offset` away, optionally
/// under an event started at time 0.
fn gateway_range_rig(event: Option<EventType>, offset: Point) -> (SimulationEngine, TowerId) {
    let mut engine = engine_with(rich_config());
    let tower_id = place(&mut engine, TowerType::Gateway, 0, 0);
    if let Some(event_type) = event {
        engine.activate_event(event_type);
    }
    let pos = tower(&engine, tower_id).pos + offset;
    pin_enemy(&mut engine, EnemyType::Trojan, pos);
    (engine, tower_id)
}

#[test]
fn test_signal_jamming_shrinks_range() {
    // Gateway range 150; jammed to 105.
    let offset = Point::new(130.0, 0.0);
    let (mut clear, _) = gateway_range_rig(None, offset);
    assert_eq!(clear.tick(FRAME_MS).projectiles.len(), 1);

    let (mut jammed, _) = gateway_range_rig(Some(EventType::SignalJamming), offset);
    assert!(jammed.tick(FRAME_MS).projectiles.is_empty());
}

/// Whether a Gateway that last fired `since_last` ms ago fires at t = 5000.
fn gateway_fires(event: Option<EventType>, since_last: f64) -> bool {
    let (mut engine, tower_id) = gateway_range_rig(event, Point::new(60.0, 0.0));
    let now = 5000.0;
    for (_entity, t) in engine.world_mut().query_mut::<&mut Tower>() {
        t.last_fired_ms = Some(now - since_last);
    }
    engine.tick(now);
    tower(&engine, tower_id).last_fired_ms == Some(now)
}

#[test]
fn test_fire_rate_events_change_cooldown() {
    // Gateway fires every 200 ms at base rate.
    assert!(!gateway_fires(None, 150.0));
    assert!(gateway_fires(None, 210.0));
    // Cache overflow: 1.8x rate, ~111 ms.
    assert!(gateway_fires(Some(EventType::CacheOverflow), 150.0));
    // Memory leak halfway through: 0.7x rate, ~286 ms.
    assert!(!gateway_fires(Some(EventType::MemoryLeak), 210.0));
    assert!(gateway_fires(Some(EventType::MemoryLeak), 290.0));
}

/// Segments a Packet walks in 100 ms under an event started at time 0.
fn packet_walk(event: Option<EventType>) -> f64 {
    let mut engine = engine_with(SimConfig::default());
    if let Some(event_type) = event {
        engine.activate_event(event_type);
    }
    let id = engine.spawn_test_enemy(EnemyType::Packet, 0).unwrap();
    engine.tick(100.0);
    walked(&enemy(&engine, id))
}

#[test]
fn test_speed_events_scale_enemy_movement() {
    let base = packet_walk(None);
    assert!((base - 0.6).abs() < 1e-9);

    let routed = packet_walk(Some(EventType::OptimizedRouting));
    assert!((routed - base * 0.65).abs() < 1e-9);

    let congestion = EventType::NetworkCongestion
        .def()
        .modifiers
        .enemy_speed
        .sample(100.0, 0.0, 10_000.0);
    assert!((congestion - 1.0).abs() > 0.05);
    let congested = packet_walk(Some(EventType::NetworkCongestion));
    assert!((congested - base * congestion).abs() < 1e-9);
}

#[test]
fn test_feedback_loop_doubles_explosive_yield() {
    let mut engine = engine_with(rich_config());
    let tower_id = place(&mut engine, TowerType::DemolitionNode, 0, 0);
    engine.activate_event(EventType::FeedbackLoop);
    let pos = tower(&engine, tower_id).pos + Point::new(100.0, 0.0);
    pin_enemy(&mut engine, EnemyType::Rootkit, pos);

    engine.tick(FRAME_MS);
    let shots: Vec<Projectile> = engine
        .world()
        .query::<&Projectile>()
        .iter()
        .map(|(_, p)| p.clone())
        .collect();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].damage, 800.0);
    assert_eq!(shots[0].explosion_radius, 200.0);
}

#[test]
fn test_mutation_tags_spawns() {
    let mut engine = engine_with(SimConfig::default());
    // God mode keeps the core alive; forced events still apply.
    engine.execute(PlayerCommand::ToggleGodMode).unwrap();
    engine.state_mut().wave = 40;
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.activate_event(EventType::MalwareMutation);

    let mut seen = HashSet::new();
    let mut mutated = 0;
    let mut effect_seen = false;
    let mut now = 0.0;
    for snap in run_until(&mut engine, &mut now, 14_000.0, 100.0) {
        effect_seen |= snap.effects.iter().any(|fx| fx.kind == EffectKind::Mutation);
        for e in &snap.enemies {
            if seen.insert(e.id) {
                // At most one trait per mutation.
                assert!(!(e.slow_immune && e.aoe_resist));
                if e.slow_immune || e.aoe_resist {
                    mutated += 1;
                }
            }
        }
    }
    assert!(seen.len() >= 15);
    assert!(mutated > 0);
    assert!(mutated < seen.len());
    assert!(effect_seen);
}

// ---- Contamination (extended) ----

fn extended_config() -> SimConfig {
    SimConfig {
        extended: true,
        ..Default::default()
    }
}

#[test]
fn test_contaminating_enemy_seeds_field() {
    let mut engine = engine_with(extended_config());
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.spawn_test_enemy(EnemyType::Rootkit, 0).unwrap();

    let snap = engine.tick(1000.0);
    assert!(snap.global_contamination > 0.0);
    assert!(!snap.contamination.is_empty());
}

#[test]
fn test_no_contamination_in_base_variant() {
    let mut engine = engine_with(SimConfig::default());
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.spawn_test_enemy(EnemyType::Rootkit, 0).unwrap();
    let snap = engine.tick(1000.0);
    assert_eq!(snap.global_contamination, 0.0);
}

#[test]
fn test_corruption_growth_and_salvage_spill() {
    let mut engine = engine_with(extended_config());
    engine.execute(PlayerCommand::StartWave).unwrap();
    let cell = HexCoord::new(0, 0);
    let id = place(&mut engine, TowerType::Firewall, 0, 0);
    engine.field_mut().add(cell, CONTAMINATION_MAX);

    engine.tick(1000.0);
    let corruption = tower(&engine, id).corruption;
    assert!((corruption - CORRUPTION_GAIN_PER_SEC).abs() < 1e-9);

    let before = engine.state().credits;
    engine.execute(PlayerCommand::SalvageTower { tower_id: id }).unwrap();
    // floor(100 · 0.75 · (1 - 0.5 · 0.05))
    assert_eq!(engine.state().credits - before, 73.0);
    let neighbor = cell.neighbors()[0];
    assert!(engine.contamination().level(neighbor) >= corruption * 0.5 * 0.25 - 1e-9);
}

#[test]
fn test_corrupted_tower_betrays() {
    let mut engine = engine_with(extended_config());
    engine.execute(PlayerCommand::StartWave).unwrap();
    engine.execute(PlayerCommand::SetSpeed { speed: 4.0 }).unwrap();
    let id = place(&mut engine, TowerType::Gateway, 0, 0);
    for (_entity, t) in engine.world_mut().query_mut::<&mut Tower>() {
        t.corruption = CONTAMINATION_MAX;
    }
    // Keeps the wave alive through one long frame.
    engine.spawn_test_enemy(EnemyType::Rootkit, 0).unwrap();

    // 5 s at 4x: betrayal is certain.
    let snap = engine.tick(5_000.0);
    assert!(snap
        .events
        .contains(&SimEvent::TowerBetrayed { tower_id: id }));
    let corruption = tower(&engine, id).corruption;
    assert!((corruption - (CONTAMINATION_MAX - BETRAYAL_CORRUPTION_RELIEF)).abs() < 1e-9);
    assert!(engine
        .world()
        .query::<&Enemy>()
        .iter()
        .any(|(_, e)| e.enemy_type == EnemyType::Fragment));
}

#[test]
fn test_wave_cap_ends_extended_game() {
    let mut engine = engine_with(extended_config());
    engine.state_mut().wave = WAVE_CAP;
    engine.execute(PlayerCommand::StartWave).unwrap();
    assert!(engine.state().game_over);
    assert!(!engine.state().wave_active);
}

#[test]
fn test_contamination_spreads_to_neighbors() {
    let mut engine = engine_with(extended_config());
    engine.execute(PlayerCommand::StartWave).unwrap();
    let id = engine.spawn_test_enemy(EnemyType::Rootkit, 0).unwrap();

    engine.tick(1000.0);
    let cell = HexCoord::from_pixel(enemy(&engine, id).pos);
    let field = engine.contamination();
    let emitted = CONTAMINATION_EMIT_PER_SEC;
    assert!((field.level(cell) - emitted).abs() < 1e-9);
    for neighbor in cell.neighbors() {
        assert!((field.level(neighbor) - emitted * CONTAMINATION_NEIGHBOR_SHARE).abs() < 1e-9);
    }
}
