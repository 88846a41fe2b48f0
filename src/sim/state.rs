//! Simulation state and core run types
//!
//! Everything the renderer and UI read lives here. The state is created at
//! game start, owned by the reducer holder and thrown away on return to the
//! menu.

use serde::{Deserialize, Serialize};

use super::collision::DeathCause;
use super::difficulty::DifficultyState;
use super::entity::{Entity, Player, SizeClass};
use super::spawn::SpawnSystem;
use crate::tuning::{ExtraLifeSchedule, Tuning};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no run in progress
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Run frozen, waiting for resume
    Paused,
    /// Run ended (lives exhausted)
    GameOver,
}

/// Notable things that happened during the last action, for presentation
/// (sound, HUD flashes) and for the persistence collaborator at game over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    FishEaten { class: SizeClass, points: u64 },
    TierUp { tier: u8 },
    TailBitten { points: u64 },
    SeahorseCollected { points: u64, extra_life: bool },
    LifeLost { cause: DeathCause, lives_left: u32 },
    ExtraLife { threshold: u64 },
    Paused,
    Resumed,
    GameOver { score: u64, tier: u8, elapsed: f32 },
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// Simulated run time in seconds (excludes paused time)
    pub elapsed: f32,
    /// Fixed steps simulated this run
    pub time_ticks: u64,
    pub player: Player,
    /// Live entities, sorted by id
    pub entities: Vec<Entity>,
    pub difficulty: DifficultyState,
    pub spawner: SpawnSystem,
    /// Extra-life thresholds already paid out, ascending
    pub extra_life_thresholds: Vec<u64>,
    /// Events produced by the most recent action
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// Idle state shown behind the title screen
    pub fn menu() -> Self {
        Self::default()
    }

    /// Fresh run with initial score, lives, tier and an empty sea
    pub fn new_run(tuning: &Tuning) -> Self {
        Self {
            phase: GamePhase::Playing,
            score: 0,
            lives: tuning.initial_lives,
            elapsed: 0.0,
            time_ticks: 0,
            player: Player::new(tuning),
            entities: Vec::new(),
            difficulty: DifficultyState::initial(&tuning.difficulty),
            spawner: SpawnSystem::new(&tuning.spawn),
            extra_life_thresholds: Vec::new(),
            events: vec![GameEvent::RunStarted],
        }
    }

    pub fn tier(&self) -> u8 {
        self.player.tier
    }

    pub fn eaten_count(&self) -> u32 {
        self.player.eaten_count
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Grant a life for every schedule threshold the score has reached
    ///
    /// Each threshold pays exactly once, however many are crossed at once.
    /// Returns the number of lives granted.
    pub fn award_extra_lives(&mut self, schedule: &ExtraLifeSchedule) -> u32 {
        let mut granted = 0;
        while let Some(threshold) = schedule.threshold(self.extra_life_thresholds.len()) {
            if self.score < threshold {
                break;
            }
            self.extra_life_thresholds.push(threshold);
            self.lives += 1;
            granted += 1;
            self.events.push(GameEvent::ExtraLife { threshold });
            log::info!("Extra life at {} points ({} lives)", threshold, self.lives);
        }
        granted
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Snapshot for hosts across a language boundary
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
