//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives in [`Tuning`]. Tests and
//! hosts override fields (or load a partial JSON table) instead of touching
//! constants.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Shape of the difficulty ramp between base and max
///
/// JSON accepts any spelling `from_str` understands ("EaseIn", "ease_in").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum DifficultyCurve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    SmoothStep,
}

impl DifficultyCurve {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyCurve::Linear => "Linear",
            DifficultyCurve::EaseIn => "EaseIn",
            DifficultyCurve::EaseOut => "EaseOut",
            DifficultyCurve::SmoothStep => "SmoothStep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(DifficultyCurve::Linear),
            "easein" | "ease_in" => Some(DifficultyCurve::EaseIn),
            "easeout" | "ease_out" => Some(DifficultyCurve::EaseOut),
            "smoothstep" | "smooth" => Some(DifficultyCurve::SmoothStep),
            _ => None,
        }
    }

    /// Map ramp progress `t` in [0, 1] to a difficulty level in [0, 1]
    ///
    /// Every curve is monotonic non-decreasing over the unit interval.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            DifficultyCurve::Linear => t,
            DifficultyCurve::EaseIn => t * t,
            DifficultyCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            DifficultyCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

impl TryFrom<String> for DifficultyCurve {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s).ok_or_else(|| format!("unknown difficulty curve {:?}", s))
    }
}

/// Per size class numbers for prey fish (Tiny..Giant)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeClassTuning {
    /// Score awarded when eaten
    pub points: u64,
    /// Multiplier on the base prey speed
    pub speed: f32,
    /// Collision radius (pixels)
    pub radius: f32,
    /// Relative spawn weight
    pub weight: u32,
}

/// When and how often one kind of entity spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub enabled: bool,
    /// Elapsed run time (seconds) before the first spawn
    pub enable_time: f32,
    /// Player tier required before this kind appears
    pub min_tier: u8,
    /// Seconds between spawns at base difficulty
    pub base_interval: f32,
    /// Interval floor at max difficulty
    pub min_interval: f32,
}

impl SpawnRule {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            enable_time: 0.0,
            min_tier: MIN_TIER,
            base_interval: 1.0,
            min_interval: 1.0,
        }
    }

    /// Interval between spawns at the given spawn-rate multiplier
    pub fn interval(&self, spawn_rate: f32) -> f32 {
        (self.base_interval / spawn_rate.max(f32::EPSILON)).max(self.min_interval)
    }
}

/// Spawn rules for every entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTable {
    pub prey: SpawnRule,
    pub shark: SpawnRule,
    pub crab: SpawnRule,
    pub jellyfish: SpawnRule,
    pub seahorse: SpawnRule,
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            prey: SpawnRule {
                enabled: true,
                enable_time: 0.0,
                min_tier: 1,
                base_interval: 1.2,
                min_interval: 0.35,
            },
            crab: SpawnRule {
                enabled: true,
                enable_time: 15.0,
                min_tier: 2,
                base_interval: 9.0,
                min_interval: 4.0,
            },
            seahorse: SpawnRule {
                enabled: true,
                enable_time: 20.0,
                min_tier: 1,
                base_interval: 25.0,
                min_interval: 15.0,
            },
            shark: SpawnRule {
                enabled: true,
                enable_time: 30.0,
                min_tier: 1,
                base_interval: 12.0,
                min_interval: 5.0,
            },
            jellyfish: SpawnRule {
                enabled: true,
                enable_time: 45.0,
                min_tier: 1,
                base_interval: 10.0,
                min_interval: 4.0,
            },
        }
    }
}

/// Time-based difficulty ramp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Seconds until max difficulty is reached
    pub ramp_duration: f32,
    pub curve: DifficultyCurve,
    pub base_spawn_rate: f32,
    pub max_spawn_rate: f32,
    pub base_speed: f32,
    pub max_speed: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            ramp_duration: 180.0,
            curve: DifficultyCurve::Linear,
            base_spawn_rate: 1.0,
            max_spawn_rate: 2.5,
            base_speed: 1.0,
            max_speed: 1.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharkTuning {
    pub radius: f32,
    /// Cruising speed while patrolling (px/s)
    pub patrol_speed: f32,
    pub dive_speed: f32,
    /// Horizontal distance to the player that triggers a dive
    pub dive_range: f32,
    /// Seconds a dive lasts
    pub dive_duration: f32,
    /// Seconds after a dive before the next can start
    pub dive_cooldown: f32,
    /// Bonus for biting the tail
    pub tail_points: u64,
}

impl Default for SharkTuning {
    fn default() -> Self {
        Self {
            radius: 40.0,
            patrol_speed: 110.0,
            dive_speed: 260.0,
            dive_range: 120.0,
            dive_duration: 1.2,
            dive_cooldown: 3.0,
            tail_points: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrabTuning {
    pub radius: f32,
    /// Walking speed along the sea floor (px/s)
    pub speed: f32,
}

impl Default for CrabTuning {
    fn default() -> Self {
        Self {
            radius: 18.0,
            speed: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JellyfishTuning {
    pub radius: f32,
    /// Horizontal drift speed (px/s)
    pub drift_speed: f32,
    /// Vertical bob amplitude (pixels)
    pub drift_amplitude: f32,
    /// Bob phase speed (radians/s)
    pub drift_frequency: f32,
}

impl Default for JellyfishTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            drift_speed: 35.0,
            drift_amplitude: 30.0,
            drift_frequency: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeahorseTuning {
    pub radius: f32,
    pub speed: f32,
    /// Seconds before an uncollected seahorse disappears
    pub ttl: f32,
    pub points: u64,
    /// Probability (0-1) that collecting grants an extra life
    pub extra_life_chance: f64,
}

impl Default for SeahorseTuning {
    fn default() -> Self {
        Self {
            radius: 14.0,
            speed: 45.0,
            ttl: 8.0,
            points: 500,
            extra_life_chance: 0.25,
        }
    }
}

/// Score thresholds that each grant one extra life
///
/// The explicit list is followed by an endless arithmetic tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraLifeSchedule {
    pub thresholds: Vec<u64>,
    /// Spacing of thresholds after the list runs out (0 = none)
    pub repeat_every: u64,
}

impl Default for ExtraLifeSchedule {
    fn default() -> Self {
        Self {
            thresholds: vec![10_000, 30_000, 60_000, 100_000],
            repeat_every: 50_000,
        }
    }
}

impl ExtraLifeSchedule {
    /// The `index`-th threshold (0-based), or None when the schedule ends
    pub fn threshold(&self, index: usize) -> Option<u64> {
        if let Some(&t) = self.thresholds.get(index) {
            return Some(t);
        }
        if self.repeat_every == 0 {
            return None;
        }
        let base = self.thresholds.last().copied().unwrap_or(0);
        let steps = (index - self.thresholds.len()) as u64 + 1;
        Some(base + steps * self.repeat_every)
    }
}

/// All tunable gameplay parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Live entity cap (spawns are skipped at the cap)
    pub max_entities: usize,

    // === Player ===
    pub initial_lives: u32,
    /// Player swim speed at full input (px/s)
    pub player_speed: f32,
    /// Player radius per tier (index 0 = tier 1)
    pub player_radius: [f32; 5],
    /// Cumulative fish eaten to reach tiers 2..=5
    pub tier_thresholds: [u32; 4],
    /// Seconds of protection after losing a life
    pub respawn_invulnerability: f32,

    // === Prey ===
    /// Base prey swim speed before class/difficulty multipliers (px/s)
    pub base_speed: f32,
    /// Tiny, Small, Medium, Large, Giant
    pub size_classes: [SizeClassTuning; 5],

    // === Hazards & bonuses ===
    pub shark: SharkTuning,
    pub crab: CrabTuning,
    pub jellyfish: JellyfishTuning,
    pub seahorse: SeahorseTuning,

    // === Progression ===
    pub spawn: SpawnTable,
    pub difficulty: DifficultyTuning,
    pub extra_lives: ExtraLifeSchedule,

    // === Input ===
    pub touch_deadzone: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            max_entities: 64,

            initial_lives: 3,
            player_speed: 220.0,
            player_radius: [12.0, 18.0, 27.0, 38.0, 50.0],
            tier_thresholds: [5, 15, 30, 50],
            respawn_invulnerability: 2.0,

            base_speed: 70.0,
            size_classes: [
                SizeClassTuning { points: 10, speed: 1.3, radius: 8.0, weight: 40 },
                SizeClassTuning { points: 25, speed: 1.15, radius: 14.0, weight: 25 },
                SizeClassTuning { points: 50, speed: 1.0, radius: 22.0, weight: 18 },
                SizeClassTuning { points: 100, speed: 0.85, radius: 32.0, weight: 11 },
                SizeClassTuning { points: 200, speed: 0.7, radius: 44.0, weight: 6 },
            ],

            shark: SharkTuning::default(),
            crab: CrabTuning::default(),
            jellyfish: JellyfishTuning::default(),
            seahorse: SeahorseTuning::default(),

            spawn: SpawnTable::default(),
            difficulty: DifficultyTuning::default(),
            extra_lives: ExtraLifeSchedule::default(),

            touch_deadzone: TOUCH_DEADZONE,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning table; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::info!(
            "Loaded tuning: {} lives, ramp {}s ({})",
            tuning.initial_lives,
            tuning.difficulty.ramp_duration,
            tuning.difficulty.curve.as_str()
        );
        Ok(tuning)
    }

    /// Serialize the table (for dumping the active balance)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.world_width <= 0.0 || self.world_height <= 0.0 {
            return Err("world dimensions must be positive".into());
        }
        if !self.tier_thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err("tier thresholds must be strictly ascending".into());
        }
        if !self.extra_lives.thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err("extra-life thresholds must be strictly ascending".into());
        }
        if self.size_classes.iter().all(|c| c.weight == 0) {
            return Err("at least one prey size class needs a spawn weight".into());
        }
        if self.difficulty.ramp_duration <= 0.0 {
            return Err("difficulty ramp duration must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.seahorse.extra_life_chance) {
            return Err("seahorse extra-life chance must be within 0..=1".into());
        }
        let d = &self.difficulty;
        if d.base_spawn_rate <= 0.0 || d.max_spawn_rate < d.base_spawn_rate {
            return Err("spawn rate must be positive and ramp upward".into());
        }
        if d.base_speed <= 0.0 || d.max_speed < d.base_speed {
            return Err("speed multiplier must be positive and ramp upward".into());
        }
        for (name, rule) in [
            ("prey", &self.spawn.prey),
            ("shark", &self.spawn.shark),
            ("crab", &self.spawn.crab),
            ("jellyfish", &self.spawn.jellyfish),
            ("seahorse", &self.spawn.seahorse),
        ] {
            if rule.enabled && (rule.base_interval <= 0.0 || rule.min_interval <= 0.0) {
                return Err(format!("{} spawn intervals must be positive", name));
            }
        }
        if self.player_speed <= 0.0 {
            return Err("player speed must be positive".into());
        }
        if self.player_radius.iter().any(|r| *r <= 0.0) {
            return Err("player radii must be positive".into());
        }
        if self.size_classes.iter().any(|c| c.radius <= 0.0) {
            return Err("prey radii must be positive".into());
        }
        Ok(())
    }

    /// Radius of the player at `tier` (1-based, clamped)
    pub fn player_radius_for(&self, tier: u8) -> f32 {
        let index = tier.clamp(MIN_TIER, MAX_TIER) as usize - 1;
        self.player_radius[index]
    }
}
