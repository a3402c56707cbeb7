//! Static game-balance tables.
//!
//! Every tower, enemy, event and difficulty is described by one row in a
//! `static` table indexed by the enum discriminant. Systems look behaviour up
//! here instead of branching on the type, so adding a type means adding a row.

use serde::Serialize;

use crate::enums::*;

/// Tower definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TowerDef {
    pub tower_type: TowerType,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: f64,
    pub damage: f64,
    /// Targeting range in pixels at level 1.
    pub range: f64,
    /// Shots per second at level 1.
    pub fire_rate: f64,
    pub color: &'static str,
    /// Hits set the target's slow timer.
    pub slowing: bool,
    /// Shots explode with radial falloff.
    pub explosive: bool,
    /// Kills by this tower split the victim into fragments.
    pub splitter: bool,
}

/// Enemy definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnemyDef {
    pub enemy_type: EnemyType,
    pub hp: f64,
    /// Segment progress per reference frame, before `MOVE_SCALE`.
    pub speed: f64,
    pub bounty: f64,
    pub color: &'static str,
    pub description: &'static str,
    pub death_effect: DeathEffect,
    /// Seeds contamination around itself (extended variant).
    pub contaminates: bool,
}

/// Time-varying multiplier attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Curve {
    Constant(f64),
    /// `1 + amplitude · sin(now / period_ms)`.
    Oscillating { amplitude: f64, period_ms: f64 },
    /// Falls linearly from 1 to `floor` over the event's duration.
    Decaying { floor: f64 },
}

impl Curve {
    pub fn sample(&self, now_ms: f64, start_ms: f64, duration_ms: f64) -> f64 {
        match *self {
            Curve::Constant(value) => value,
            Curve::Oscillating {
                amplitude,
                period_ms,
            } => 1.0 + amplitude * (now_ms / period_ms).sin(),
            Curve::Decaying { floor } => {
                let t = if duration_ms > 0.0 {
                    ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                1.0 - (1.0 - floor) * t
            }
        }
    }
}

/// Effect on the subset of towers an event flags at activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkEffect {
    pub mark: TowerMark,
    /// Share of towers flagged (rounded up).
    pub share: f64,
    pub fire_rate: f64,
    pub range: f64,
}

/// Global simulation modifiers installed while an event is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventModifiers {
    pub enemy_speed: Curve,
    pub tower_range: f64,
    pub fire_rate: Curve,
    pub marked: Option<MarkEffect>,
    pub spawns_per_tick: u32,
    /// Spawning continues past the wave quota while active.
    pub unbounded_spawns: bool,
    pub spawn_hp: f64,
    pub bounty: f64,
    pub explosive_yield: f64,
    pub contamination_growth: f64,
    /// Lockdown: tower upgrades are refused.
    pub locks_upgrades: bool,
    pub mutates_spawns: bool,
}

impl EventModifiers {
    /// No modification at all.
    pub const NONE: EventModifiers = EventModifiers {
        enemy_speed: Curve::Constant(1.0),
        tower_range: 1.0,
        fire_rate: Curve::Constant(1.0),
        marked: None,
        spawns_per_tick: 1,
        unbounded_spawns: false,
        spawn_hp: 1.0,
        bounty: 1.0,
        explosive_yield: 1.0,
        contamination_growth: 1.0,
        locks_upgrades: false,
        mutates_spawns: false,
    };
}

/// Event definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EventDef {
    pub event_type: EventType,
    pub name: &'static str,
    pub description: &'static str,
    pub duration_ms: f64,
    pub category: EventCategory,
    pub modifiers: EventModifiers,
}

/// Difficulty definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DifficultyDef {
    pub difficulty: Difficulty,
    pub name: &'static str,
    pub description: &'static str,
    pub bounty_mult: f64,
    pub cost_mult: f64,
    pub hp_mult: f64,
    pub speed_mult: f64,
    pub event_pool: &'static [EventCategory],
    pub event_cooldown_mult: f64,
    /// Delay before an auto-started wave (ms).
    pub wave_cooldown_ms: f64,
    pub dual_path: bool,
    pub path_policy: PathPolicy,
}

/// One row of the wave-gated spawn table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpawnRule {
    /// Rule applies once the wave number exceeds this.
    pub after_wave: u32,
    /// Rule applies when the uniform roll exceeds this.
    pub roll_above: f64,
    pub enemy_type: EnemyType,
}

impl TowerType {
    pub fn def(self) -> &'static TowerDef {
        &TOWER_DEFS[self as usize]
    }
}

impl EnemyType {
    pub fn def(self) -> &'static EnemyDef {
        &ENEMY_DEFS[self as usize]
    }
}

impl EventType {
    pub fn def(self) -> &'static EventDef {
        &EVENT_DEFS[self as usize]
    }
}

impl Difficulty {
    pub fn def(self) -> &'static DifficultyDef {
        &DIFFICULTY_DEFS[self as usize]
    }
}

/// Checked in order; the first matching rule wins, otherwise `Packet`.
pub static SPAWN_TABLE: [SpawnRule; 8] = [
    SpawnRule { after_wave: 30, roll_above: 0.90, enemy_type: EnemyType::Rootkit },
    SpawnRule { after_wave: 22, roll_above: 0.85, enemy_type: EnemyType::Ransomware },
    SpawnRule { after_wave: 18, roll_above: 0.80, enemy_type: EnemyType::BotnetNode },
    SpawnRule { after_wave: 14, roll_above: 0.75, enemy_type: EnemyType::LogicBomb },
    SpawnRule { after_wave: 11, roll_above: 0.70, enemy_type: EnemyType::Spyware },
    SpawnRule { after_wave: 8, roll_above: 0.60, enemy_type: EnemyType::Trojan },
    SpawnRule { after_wave: 5, roll_above: 0.50, enemy_type: EnemyType::Worm },
    SpawnRule { after_wave: 2, roll_above: 0.30, enemy_type: EnemyType::Virus },
];

const fn tower(
    tower_type: TowerType,
    name: &'static str,
    description: &'static str,
    cost: f64,
    damage: f64,
    range: f64,
    fire_rate: f64,
    color: &'static str,
) -> TowerDef {
    TowerDef {
        tower_type,
        name,
        description,
        cost,
        damage,
        range,
        fire_rate,
        color,
        slowing: false,
        explosive: false,
        splitter: false,
    }
}

pub static TOWER_DEFS: [TowerDef; 11] = [
    tower(
        TowerType::Gateway,
        "Gateway V1",
        "Early swarm cleaner. High fire rate, low integrity impact.",
        40.0, 6.0, 150.0, 5.0, "#39FF14",
    ),
    tower(
        TowerType::Firewall,
        "Firewall V2",
        "Choke-point burst. High damage per shot.",
        100.0, 75.0, 160.0, 1.2, "#39FF14",
    ),
    tower(
        TowerType::Sentinel,
        "Sentinel X",
        "Priority killer. Range + precision.",
        200.0, 180.0, 420.0, 0.5, "#00f7ff",
    ),
    TowerDef {
        slowing: true,
        ..tower(
            TowerType::Sandbox,
            "Sandbox",
            "Time control. Buys time so other kernels can work.",
            250.0, 2.0, 180.0, 2.0, "#f0ff42",
        )
    },
    tower(
        TowerType::VpnNode,
        "VPN Node",
        "Generalist fallback. Flexible and stable.",
        350.0, 50.0, 240.0, 2.8, "#00ffaa",
    ),
    tower(
        TowerType::Decryptor,
        "Decryptor Pro",
        "Anti-tank behemoth. Deletes big problems with massive hits.",
        500.0, 650.0, 220.0, 0.4, "#bc13fe",
    ),
    TowerDef {
        splitter: true,
        ..tower(
            TowerType::ProxyServer,
            "Proxy Server",
            "Enemy transformer. Manipulates state into fast fragments.",
            650.0, 35.0, 260.0, 3.0, "#ff00ff",
        )
    },
    TowerDef {
        explosive: true,
        ..tower(
            TowerType::DemolitionNode,
            "Demolition Node",
            "Sector clearing utility. Fires high-yield explosive payloads.",
            750.0, 400.0, 200.0, 0.3, "#ffaa00",
        )
    },
    tower(
        TowerType::AntiMalware,
        "Anti-Malware",
        "Heavy eradicator. Specialized \"end this now\" button.",
        900.0, 1500.0, 300.0, 0.3, "#ff2e2e",
    ),
    tower(
        TowerType::EncryptionEngine,
        "Encrypt Engine",
        "High-throughput defense. Consistent bit-stripping.",
        1300.0, 400.0, 260.0, 3.5, "#ffffff",
    ),
    tower(
        TowerType::QuantumCore,
        "Quantum Core",
        "Late-game anchor. Control + dominance.",
        2200.0, 4000.0, 450.0, 0.5, "#39FF14",
    ),
];

const fn enemy(
    enemy_type: EnemyType,
    hp: f64,
    speed: f64,
    bounty: f64,
    color: &'static str,
    description: &'static str,
) -> EnemyDef {
    EnemyDef {
        enemy_type,
        hp,
        speed,
        bounty,
        color,
        description,
        death_effect: DeathEffect::None,
        contaminates: false,
    }
}

pub static ENEMY_DEFS: [EnemyDef; 11] = [
    enemy(EnemyType::Packet, 20.0, 0.02, 8.0, "#39FF14", "Basic data fragments. Low integrity."),
    enemy(EnemyType::Virus, 60.0, 0.012, 18.0, "#39FF14", "Standard self-replicating code."),
    enemy(EnemyType::Worm, 45.0, 0.024, 25.0, "#f0ff42", "High-velocity malware."),
    enemy(EnemyType::Trojan, 350.0, 0.008, 85.0, "#ff2e2e", "High-density armored payload."),
    enemy(EnemyType::Spyware, 120.0, 0.02, 45.0, "#00f7ff", "Agile tracking units."),
    EnemyDef {
        contaminates: true,
        ..enemy(EnemyType::Ransomware, 1100.0, 0.006, 220.0, "#ff00ff", "Encrypted block units.")
    },
    EnemyDef {
        contaminates: true,
        ..enemy(EnemyType::Rootkit, 2800.0, 0.005, 500.0, "#bc13fe", "Deep-level infector.")
    },
    EnemyDef {
        death_effect: DeathEffect::Disrupt,
        ..enemy(
            EnemyType::LogicBomb,
            650.0,
            0.018,
            150.0,
            "#ffaa00",
            "Volatile logic gate. On death, disables nearby kernels.",
        )
    },
    enemy(EnemyType::BotnetNode, 200.0, 0.012, 65.0, "#00ffaa", "Swarm coordinator."),
    EnemyDef {
        contaminates: true,
        ..enemy(
            EnemyType::ZeroDay,
            7000.0,
            0.004,
            2500.0,
            "#ffffff",
            "APEX THREAT. An unpatchable vulnerability.",
        )
    },
    enemy(
        EnemyType::Fragment,
        80.0,
        0.03,
        10.0,
        "#bc13fe",
        "Shard of a corrupted kernel turned hostile.",
    ),
];

const fn event(
    event_type: EventType,
    name: &'static str,
    description: &'static str,
    duration_ms: f64,
    category: EventCategory,
    modifiers: EventModifiers,
) -> EventDef {
    EventDef {
        event_type,
        name,
        description,
        duration_ms,
        category,
        modifiers,
    }
}

pub static EVENT_DEFS: [EventDef; 12] = [
    event(
        EventType::SignalJamming,
        "SIGNAL JAMMING",
        "Tower targeting range reduced by 30%.",
        8000.0,
        EventCategory::Bad,
        EventModifiers { tower_range: 0.7, ..EventModifiers::NONE },
    ),
    event(
        EventType::MemoryLeak,
        "MEMORY LEAK",
        "Towers gain progressive firing delay.",
        10_000.0,
        EventCategory::Bad,
        EventModifiers { fire_rate: Curve::Decaying { floor: 0.4 }, ..EventModifiers::NONE },
    ),
    event(
        EventType::PacketFlood,
        "PACKET FLOOD",
        "Heavy incoming traffic detected. Spawning intensified.",
        12_000.0,
        EventCategory::Bad,
        EventModifiers {
            spawns_per_tick: 3,
            unbounded_spawns: true,
            spawn_hp: 0.7,
            ..EventModifiers::NONE
        },
    ),
    event(
        EventType::TowerInterference,
        "TOWER INTERFERENCE",
        "A subset of towers are firing 30% slower.",
        7000.0,
        EventCategory::Bad,
        EventModifiers {
            marked: Some(MarkEffect {
                mark: TowerMark::Interfered,
                share: 0.35,
                fire_rate: 0.7,
                range: 1.0,
            }),
            ..EventModifiers::NONE
        },
    ),
    event(
        EventType::EmergencyPatch,
        "EMERGENCY PATCH",
        "System buffing random kernels. Caution: CPU usage spiked.",
        7000.0,
        EventCategory::Good,
        EventModifiers {
            marked: Some(MarkEffect {
                mark: TowerMark::Patched,
                share: 0.25,
                fire_rate: 1.4,
                range: 1.4,
            }),
            ..EventModifiers::NONE
        },
    ),
    event(
        EventType::OptimizedRouting,
        "OPTIMIZED ROUTING",
        "Malware movement stabilized and slowed.",
        9000.0,
        EventCategory::Good,
        EventModifiers { enemy_speed: Curve::Constant(0.65), ..EventModifiers::NONE },
    ),
    event(
        EventType::CacheOverflow,
        "CACHE OVERFLOW",
        "Kernels ignoring cooldown protocols.",
        6000.0,
        EventCategory::Good,
        EventModifiers { fire_rate: Curve::Constant(1.8), ..EventModifiers::NONE },
    ),
    event(
        EventType::NetworkCongestion,
        "NETWORK CONGESTION",
        "Global throughput fluctuating. Timing is critical.",
        10_000.0,
        EventCategory::Neutral,
        EventModifiers {
            enemy_speed: Curve::Oscillating { amplitude: 0.5, period_ms: 600.0 },
            ..EventModifiers::NONE
        },
    ),
    event(
        EventType::MalwareMutation,
        "MALWARE MUTATION",
        "Threats evolving new defense traits.",
        15_000.0,
        EventCategory::Neutral,
        EventModifiers { mutates_spawns: true, bounty: 1.25, ..EventModifiers::NONE },
    ),
    event(
        EventType::FeedbackLoop,
        "FEEDBACK LOOP",
        "Explosive yields doubled. Warning: Volatile debris.",
        7000.0,
        EventCategory::Neutral,
        EventModifiers { explosive_yield: 2.0, ..EventModifiers::NONE },
    ),
    event(
        EventType::CorruptionSurge,
        "CORRUPTION SURGE",
        "Contamination spreading rapidly. Bounties raised.",
        9000.0,
        EventCategory::Hostile,
        EventModifiers { contamination_growth: 3.0, bounty: 1.5, ..EventModifiers::NONE },
    ),
    event(
        EventType::Quarantine,
        "QUARANTINE",
        "Kernel lockdown in effect. Upgrades suspended.",
        8000.0,
        EventCategory::Hostile,
        EventModifiers { locks_upgrades: true, ..EventModifiers::NONE },
    ),
];

pub static DIFFICULTY_DEFS: [DifficultyDef; 4] = [
    DifficultyDef {
        difficulty: Difficulty::Easy,
        name: "Training Protocol",
        description: "System diagnostics and safe-environment testing.",
        bounty_mult: 1.25,
        cost_mult: 0.8,
        hp_mult: 0.8,
        speed_mult: 0.8,
        event_pool: &[EventCategory::Good, EventCategory::Neutral],
        event_cooldown_mult: 1.25,
        wave_cooldown_ms: 8000.0,
        dual_path: false,
        path_policy: PathPolicy::Primary,
    },
    DifficultyDef {
        difficulty: Difficulty::Normal,
        name: "Standard Defense",
        description: "Operating within baseline security parameters.",
        bounty_mult: 1.0,
        cost_mult: 1.0,
        hp_mult: 1.0,
        speed_mult: 1.0,
        event_pool: &[EventCategory::Good, EventCategory::Bad, EventCategory::Neutral],
        event_cooldown_mult: 1.0,
        wave_cooldown_ms: 4000.0,
        dual_path: false,
        path_policy: PathPolicy::Primary,
    },
    DifficultyDef {
        difficulty: Difficulty::Hard,
        name: "Multi-Vector Assault",
        description: "Simultaneous breaches detected across parallel nodes.",
        bounty_mult: 0.9,
        cost_mult: 1.1,
        hp_mult: 1.15,
        speed_mult: 1.1,
        event_pool: &[EventCategory::Bad, EventCategory::Neutral],
        event_cooldown_mult: 0.9,
        wave_cooldown_ms: 2500.0,
        dual_path: true,
        path_policy: PathPolicy::Escalating,
    },
    DifficultyDef {
        difficulty: Difficulty::Nightmare,
        name: "System Instability",
        description: "Complete core collapse imminent. Logic gates fluctuating.",
        bounty_mult: 0.75,
        cost_mult: 1.4,
        hp_mult: 1.5,
        speed_mult: 1.3,
        event_pool: &[EventCategory::Bad, EventCategory::Neutral],
        event_cooldown_mult: 0.75,
        wave_cooldown_ms: 1000.0,
        dual_path: true,
        path_policy: PathPolicy::Uniform,
    },
];
