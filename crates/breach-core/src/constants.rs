//! Simulation constants and tuning parameters.

// --- Grid ---

/// Hex cell size (centre to corner) in pixels.
pub const HEX_SIZE: f64 = 40.0;

/// Grid width in cells; q spans `[-GRID_COLS/2, GRID_COLS/2)`.
pub const GRID_COLS: i32 = 26;

/// Grid height in cells; r spans `[-GRID_ROWS/2, GRID_ROWS/2)`.
pub const GRID_ROWS: i32 = 16;

// --- Player ---

/// Starting credits.
pub const STARTING_CREDITS: f64 = 250.0;

/// Maximum (and starting) core health.
pub const MAX_HEALTH: f64 = 100.0;

/// Health lost when a regular enemy reaches the core.
pub const LEAK_DAMAGE: f64 = 5.0;

/// Health lost when a boss reaches the core.
pub const BOSS_LEAK_DAMAGE: f64 = 50.0;

/// Upper bound for the global speed multiplier.
pub const MAX_SPEED: f64 = 4.0;

// --- Frame timing ---

/// Reference frame length (ms) that enemy speeds are tuned against (60 Hz).
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Segment progress per reference frame per unit of enemy speed.
pub const MOVE_SCALE: f64 = 5.0;

// --- Enemies ---

/// Speed multiplier applied while an enemy's slow timer is running.
pub const SLOW_FACTOR: f64 = 0.5;

/// Slow duration applied by slowing projectiles (ms).
pub const SLOW_DURATION_MS: f64 = 2000.0;

/// Per-wave enemy health growth rate.
pub const HP_GROWTH_RATE: f64 = 1.12;

// --- Towers ---

/// Highest level a tower can be upgraded to.
pub const MAX_TOWER_LEVEL: u8 = 3;

/// Damage multiplier per level above 1 (geometric).
pub const LEVEL_DAMAGE_GROWTH: f64 = 1.4;

/// Range gain per level above 1 (linear).
pub const LEVEL_RANGE_STEP: f64 = 0.15;

/// Fire-rate gain per level above 1 (linear).
pub const LEVEL_FIRE_RATE_STEP: f64 = 0.2;

/// Cosmetic rotation per frame at 1x speed.
pub const ROTATION_RATE: f64 = 0.05;

/// Fraction of invested cost refunded on salvage.
pub const SALVAGE_REFUND: f64 = 0.75;

// --- Projectiles ---

/// Default projectile speed (px/s).
pub const PROJECTILE_SPEED: f64 = 650.0;

/// Explosive projectile speed (px/s).
pub const EXPLOSIVE_PROJECTILE_SPEED: f64 = 400.0;

/// Explosion radius at level 0; grows by `EXPLOSION_RADIUS_PER_LEVEL`.
pub const EXPLOSION_BASE_RADIUS: f64 = 80.0;

/// Explosion radius gained per tower level.
pub const EXPLOSION_RADIUS_PER_LEVEL: f64 = 20.0;

/// Distance at which a projectile counts as having reached its target (px).
pub const IMPACT_RADIUS: f64 = 12.0;

/// Area damage multiplier for aoe-resistant enemies.
pub const AOE_RESIST_FACTOR: f64 = 0.5;

// --- Death effects ---

/// Radius of a logic bomb's disruption burst (px).
pub const DISRUPTION_RADIUS: f64 = 150.0;

/// How long disrupted towers stay offline (ms).
pub const DISRUPTION_DURATION_MS: f64 = 2000.0;

/// Share of a disrupted tower's invested cost charged as repair.
pub const DISRUPTION_PENALTY: f64 = 0.1;

/// Fragment health as a share of the parent's max health.
pub const FRAGMENT_HP_FACTOR: f64 = 0.35;

/// Fragment speed as a multiple of the parent's base speed.
pub const FRAGMENT_SPEED_FACTOR: f64 = 1.5;

/// Fragment bounty as a share of the parent's bounty (floored).
pub const FRAGMENT_BOUNTY_FACTOR: f64 = 0.25;

/// Full width of the random offset applied to fragment spawn positions (px).
pub const FRAGMENT_JITTER: f64 = 10.0;

/// Maximum split generations; fragments at this depth never split again.
pub const MAX_SPLIT_DEPTH: u8 = 1;

// --- Waves ---

/// Enemies in every wave before growth.
pub const WAVE_BASE_ENEMIES: u32 = 8;

/// Additional enemies per wave number (floored).
pub const WAVE_ENEMIES_PER_WAVE: f64 = 1.5;

/// Every Nth wave opens with a boss.
pub const BOSS_WAVE_INTERVAL: u32 = 10;

/// Scaled time between spawn ticks (ms).
pub const SPAWN_INTERVAL_MS: f64 = 700.0;

/// Extended variant: waves beyond this double their quota.
pub const LATE_GAME_WAVE: u32 = 25;

/// Extended variant: starting a wave beyond this ends the game.
pub const WAVE_CAP: u32 = 50;

/// Chance that a spawn mutates during a mutation event.
pub const MUTATION_CHANCE: f64 = 0.5;

// --- Events ---

/// Base time between random events at 1x speed (ms).
pub const EVENT_COOLDOWN_MS: f64 = 20_000.0;

/// Events cannot trigger this early into a wave (ms).
pub const EVENT_GRACE_MS: f64 = 10_000.0;

// --- Contamination (extended variant) ---

/// Contamination added per scaled second to a contaminating enemy's cell.
pub const CONTAMINATION_EMIT_PER_SEC: f64 = 4.0;

/// Share of emitted contamination that reaches each neighbouring cell.
pub const CONTAMINATION_NEIGHBOR_SHARE: f64 = 0.5;

/// Tower corruption gained per scaled second on a fully contaminated cell.
pub const CORRUPTION_GAIN_PER_SEC: f64 = 5.0;

/// Corruption above which shots may invert.
pub const CORRUPTION_INVERT_THRESHOLD: f64 = 50.0;

/// Corruption above which a tower may betray.
pub const CORRUPTION_BETRAYAL_THRESHOLD: f64 = 85.0;

/// Betrayal probability per scaled second above the threshold.
pub const BETRAYAL_CHANCE_PER_SEC: f64 = 0.05;

/// Corruption shed by a tower after it betrays.
pub const BETRAYAL_CORRUPTION_RELIEF: f64 = 30.0;

/// Share of damage an inverted projectile heals instead.
pub const INVERTED_HEAL_FACTOR: f64 = 0.5;

/// Share of salvage refund lost at full corruption.
pub const SALVAGE_CORRUPTION_PENALTY: f64 = 0.5;

/// Share of a salvaged tower's corruption spilled into its own cell.
pub const SALVAGE_SPILL_SHARE: f64 = 0.5;

/// Share of the spill that reaches each neighbouring cell.
pub const SALVAGE_NEIGHBOR_SHARE: f64 = 0.25;

/// Number of fully contaminated cells that saturate global contamination.
pub const CONTAMINATION_SATURATION_CELLS: f64 = 20.0;

/// Event cooldown reduction at 100% global contamination.
pub const CONTAMINATION_COOLDOWN_RELIEF: f64 = 0.5;

/// Upper bound of every contamination and corruption value.
pub const CONTAMINATION_MAX: f64 = 100.0;

// --- Visual effects ---

pub const EXPLOSION_EFFECT_MS: f64 = 400.0;
pub const DISRUPTION_EFFECT_MS: f64 = 800.0;
pub const FLASH_EFFECT_MS: f64 = 500.0;
pub const FLASH_EFFECT_RADIUS: f64 = 2000.0;
pub const MUTATION_EFFECT_MS: f64 = 600.0;
pub const BETRAYAL_EFFECT_MS: f64 = 900.0;
