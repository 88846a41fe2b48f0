//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (owned by the caller)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionEvent, Contact, DeathCause};
pub use difficulty::DifficultyState;
pub use entity::{Entity, EntityKind, Player, SharkMode, SharkState, SizeClass, can_eat};
pub use spawn::{SpawnKind, SpawnSystem};
pub use state::{GameEvent, GamePhase, SimulationState};
pub use tick::{Action, Command, LoopCommand, Transition, reduce, tick};
