//! Random system events: expiry, rolling and the per-frame modifiers they install.

use hecs::World;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use breach_core::components::Tower;
use breach_core::constants::*;
use breach_core::enums::*;
use breach_core::events::SimEvent;
use breach_core::state::ActiveEvent;
use breach_core::tables::{EventModifiers, MarkEffect};
use breach_core::types::{Point, TowerId};

use crate::game_state::GameState;
use crate::world_setup;

/// Event modifiers sampled once for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameModifiers {
    pub enemy_speed: f64,
    pub tower_range: f64,
    pub fire_rate: f64,
    pub marked: Option<MarkEffect>,
    pub spawns_per_tick: u32,
    pub unbounded_spawns: bool,
    pub spawn_hp: f64,
    pub bounty: f64,
    pub explosive_yield: f64,
    pub contamination_growth: f64,
    pub locks_upgrades: bool,
    pub mutates_spawns: bool,
}

impl Default for FrameModifiers {
    fn default() -> Self {
        modifiers(None, 0.0)
    }
}

impl FrameModifiers {
    /// Extra `(fire_rate, range)` factors for a tower carrying an event mark.
    pub fn mark_factors(&self, tower: &Tower) -> (f64, f64) {
        match self.marked {
            Some(effect) if is_marked(tower, effect.mark) => (effect.fire_rate, effect.range),
            _ => (1.0, 1.0),
        }
    }
}

fn is_marked(tower: &Tower, mark: TowerMark) -> bool {
    match mark {
        TowerMark::Interfered => tower.interfered,
        TowerMark::Patched => tower.patched,
    }
}

/// Sample the modifiers of the active event (or none) at `now_ms`.
pub fn modifiers(active: Option<&ActiveEvent>, now_ms: f64) -> FrameModifiers {
    let (table, start_ms, duration_ms) = match active {
        Some(event) => (
            &event.event_type.def().modifiers,
            event.start_ms,
            event.duration_ms,
        ),
        None => (&EventModifiers::NONE, now_ms, 0.0),
    };
    FrameModifiers {
        enemy_speed: table.enemy_speed.sample(now_ms, start_ms, duration_ms),
        tower_range: table.tower_range,
        fire_rate: table.fire_rate.sample(now_ms, start_ms, duration_ms),
        marked: table.marked,
        spawns_per_tick: table.spawns_per_tick,
        unbounded_spawns: table.unbounded_spawns,
        spawn_hp: table.spawn_hp,
        bounty: table.bounty,
        explosive_yield: table.explosive_yield,
        contamination_growth: table.contamination_growth,
        locks_upgrades: table.locks_upgrades,
        mutates_spawns: table.mutates_spawns,
    }
}

/// Minimum time between events at the current speed, difficulty and
/// contamination level.
pub fn event_cooldown_ms(state: &GameState, global_contamination: f64) -> f64 {
    let mut cooldown = EVENT_COOLDOWN_MS / state.speed * state.difficulty.def().event_cooldown_mult;
    if state.extended {
        let saturation = (global_contamination / CONTAMINATION_MAX).clamp(0.0, 1.0);
        cooldown *= 1.0 - CONTAMINATION_COOLDOWN_RELIEF * saturation;
    }
    cooldown
}

/// Event types that can be rolled under the current difficulty and variant.
pub fn candidates(state: &GameState) -> Vec<EventType> {
    let pool = state.difficulty.def().event_pool;
    EventType::ALL
        .into_iter()
        .filter(|event_type| {
            let category = event_type.def().category;
            pool.contains(&category) || (state.extended && category == EventCategory::Hostile)
        })
        .collect()
}

/// Clear every tower's event marks.
pub fn clear_marks(world: &mut World) {
    for (_entity, tower) in world.query_mut::<&mut Tower>() {
        tower.interfered = false;
        tower.patched = false;
    }
}

/// End the active event, if any, without stamping the cooldown.
pub fn clear_active(world: &mut World, state: &mut GameState) -> Option<EventType> {
    let event = state.active_event.take()?;
    clear_marks(world);
    Some(event.event_type)
}

/// Expire the active event or roll a new one.
pub fn run(
    world: &mut World,
    state: &mut GameState,
    rng: &mut ChaCha8Rng,
    global_contamination: f64,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    if let Some(active) = &state.active_event {
        if active.is_expired(now_ms) {
            let event_type = active.event_type;
            clear_active(world, state);
            state.last_event_ms = now_ms;
            debug!(?event_type, "event expired");
            events.push(SimEvent::EventEnded { event_type });
        }
        return;
    }

    if !state.wave_active || state.god_mode || state.game_over {
        return;
    }
    if now_ms - state.wave_start_ms < EVENT_GRACE_MS {
        return;
    }
    if now_ms - state.last_event_ms <= event_cooldown_ms(state, global_contamination) {
        return;
    }

    let pool = candidates(state);
    let Some(&event_type) = pool.choose(rng) else {
        return;
    };
    activate(world, state, rng, event_type, now_ms);
    debug!(?event_type, wave = state.wave, "event triggered");
    events.push(SimEvent::EventStarted { event_type });
}

/// Install an event, flagging its share of towers.
pub fn activate(
    world: &mut World,
    state: &mut GameState,
    rng: &mut ChaCha8Rng,
    event_type: EventType,
    now_ms: f64,
) {
    let event = ActiveEvent::new(event_type, now_ms);

    if let Some(effect) = event_type.def().modifiers.marked {
        let mut towers: Vec<(TowerId, hecs::Entity)> = world
            .query::<&Tower>()
            .iter()
            .map(|(entity, tower)| (tower.id, entity))
            .collect();
        towers.sort_by_key(|(id, _)| *id);
        towers.shuffle(rng);
        let count = (towers.len() as f64 * effect.share).ceil() as usize;
        for (_, entity) in towers.into_iter().take(count) {
            if let Ok(mut tower) = world.get::<&mut Tower>(entity) {
                match effect.mark {
                    TowerMark::Interfered => tower.interfered = true,
                    TowerMark::Patched => tower.patched = true,
                }
            }
        }
    }

    world_setup::spawn_effect(
        world,
        EffectKind::Flash,
        Point::ZERO,
        FLASH_EFFECT_RADIUS,
        now_ms,
        FLASH_EFFECT_MS,
    );
    state.active_event = Some(event);
}
