//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Tower archetype. Stats live in `tables::TOWER_DEFS`, indexed by discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerType {
    Gateway,
    Firewall,
    Sentinel,
    Sandbox,
    VpnNode,
    Decryptor,
    ProxyServer,
    DemolitionNode,
    AntiMalware,
    EncryptionEngine,
    QuantumCore,
}

impl TowerType {
    pub const ALL: [TowerType; 11] = [
        TowerType::Gateway,
        TowerType::Firewall,
        TowerType::Sentinel,
        TowerType::Sandbox,
        TowerType::VpnNode,
        TowerType::Decryptor,
        TowerType::ProxyServer,
        TowerType::DemolitionNode,
        TowerType::AntiMalware,
        TowerType::EncryptionEngine,
        TowerType::QuantumCore,
    ];
}

/// Enemy archetype, from low-tier packets up to the apex zero-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    Packet,
    Virus,
    Worm,
    Trojan,
    Spyware,
    Ransomware,
    Rootkit,
    LogicBomb,
    BotnetNode,
    ZeroDay,
    /// Hostile shard spawned by a betraying tower.
    Fragment,
}

impl EnemyType {
    pub const ALL: [EnemyType; 11] = [
        EnemyType::Packet,
        EnemyType::Virus,
        EnemyType::Worm,
        EnemyType::Trojan,
        EnemyType::Spyware,
        EnemyType::Ransomware,
        EnemyType::Rootkit,
        EnemyType::LogicBomb,
        EnemyType::BotnetNode,
        EnemyType::ZeroDay,
        EnemyType::Fragment,
    ];
}

/// Random system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    SignalJamming,
    MemoryLeak,
    PacketFlood,
    TowerInterference,
    EmergencyPatch,
    OptimizedRouting,
    CacheOverflow,
    NetworkCongestion,
    MalwareMutation,
    FeedbackLoop,
    CorruptionSurge,
    Quarantine,
}

impl EventType {
    pub const ALL: [EventType; 12] = [
        EventType::SignalJamming,
        EventType::MemoryLeak,
        EventType::PacketFlood,
        EventType::TowerInterference,
        EventType::EmergencyPatch,
        EventType::OptimizedRouting,
        EventType::CacheOverflow,
        EventType::NetworkCongestion,
        EventType::MalwareMutation,
        EventType::FeedbackLoop,
        EventType::CorruptionSurge,
        EventType::Quarantine,
    ];
}

/// Event category; difficulties permit a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Good,
    Bad,
    Neutral,
    /// Only rolled in the extended (contamination) variant.
    Hostile,
}

/// Difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Nightmare,
    ];
}

/// How spawns are distributed across the available paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathPolicy {
    /// Always the primary path.
    Primary,
    /// Secondary path with a chance that grows with the wave number.
    Escalating,
    /// Uniform over all available paths.
    Uniform,
}

/// Side effect applied when an enemy dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathEffect {
    None,
    /// Disables nearby towers and charges repair costs.
    Disrupt,
}

/// Tower flag set by targeted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerMark {
    Interfered,
    Patched,
}

/// Presentation-only effect category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Explosion,
    Disruption,
    Flash,
    Mutation,
    Betrayal,
}
