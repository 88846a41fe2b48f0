//! Fixed timestep simulation tick and the phase state machine
//!
//! `reduce` is the pure transition `(state, action) -> state` used by the
//! game holder. It also reports what the loop should do (start, pause,
//! resume, stop) so the holder can keep the loop in step with the phase.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{self, CollisionEvent, DeathCause};
use super::difficulty::DifficultyState;
use super::state::{GameEvent, GamePhase, SimulationState};
use crate::tuning::Tuning;

/// Lifecycle commands issued by the UI (or the pause key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Menu -> Playing
    Start,
    Pause,
    Resume,
    /// Pause while playing, resume while paused
    TogglePause,
    /// GameOver -> Playing with a fresh run
    Restart,
    /// Abandon the run and return to the menu
    Quit,
}

/// What the game loop should do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopCommand {
    Start,
    Pause,
    Resume,
    Stop,
}

/// Input to the reducer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Command(Command),
    /// One fixed step of `dt` seconds with the fused steering vector
    Tick { dt: f32, steer: Vec2 },
}

/// Result of a reduction
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SimulationState,
    pub loop_command: Option<LoopCommand>,
}

/// Fold one action into the state
///
/// Commands that do not apply to the current phase are ignored.
pub fn reduce<R: Rng + ?Sized>(
    mut state: SimulationState,
    action: Action,
    tuning: &Tuning,
    rng: &mut R,
) -> Transition {
    state.events.clear();

    let loop_command = match action {
        Action::Tick { dt, steer } => tick(&mut state, steer, dt, tuning, rng),
        Action::Command(command) => apply_command(&mut state, command, tuning),
    };

    Transition { state, loop_command }
}

fn apply_command(state: &mut SimulationState, command: Command, tuning: &Tuning) -> Option<LoopCommand> {
    use Command::*;

    match (state.phase, command) {
        (GamePhase::Menu, Start) | (GamePhase::GameOver, Restart) => {
            *state = SimulationState::new_run(tuning);
            log::info!("Run started ({} lives)", state.lives);
            Some(LoopCommand::Start)
        }
        (GamePhase::Playing, Pause | TogglePause) => {
            state.phase = GamePhase::Paused;
            state.events.push(GameEvent::Paused);
            Some(LoopCommand::Pause)
        }
        (GamePhase::Paused, Resume | TogglePause) => {
            state.phase = GamePhase::Playing;
            state.events.push(GameEvent::Resumed);
            Some(LoopCommand::Resume)
        }
        (GamePhase::Playing | GamePhase::Paused | GamePhase::GameOver, Quit) => {
            *state = SimulationState::menu();
            Some(LoopCommand::Stop)
        }
        (phase, command) => {
            log::debug!("Ignoring {:?} in {:?}", command, phase);
            None
        }
    }
}

/// Advance a playing run by one fixed timestep of `dt` seconds
///
/// Order: time, player, entity behaviours, culling, spawning, collisions,
/// scoring, extra lives, the tick's death (if any), game over.
pub fn tick<R: Rng + ?Sized>(
    state: &mut SimulationState,
    steer: Vec2,
    dt: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<LoopCommand> {
    if state.phase != GamePhase::Playing {
        return None;
    }

    state.time_ticks += 1;
    state.elapsed += dt;
    state.difficulty = DifficultyState::at(state.elapsed, &tuning.difficulty);

    // Movement
    state.player.steer(steer, dt, tuning);
    let player_pos = state.player.pos;
    for entity in &mut state.entities {
        entity.advance(dt, player_pos, tuning);
    }
    let (w, h) = (tuning.world_width, tuning.world_height);
    state.entities.retain(|e| e.alive && !e.is_offscreen(w, h));

    // Spawning
    let spawned = state.spawner.update(
        state.elapsed,
        state.player.tier,
        &state.difficulty,
        state.entities.len(),
        tuning,
        rng,
    );
    state.entities.extend(spawned);

    // Collisions, judged against the tier at the start of this tick
    let events = collision::run(&state.player, &mut state.entities, tuning, rng);
    let mut death = None;
    for event in events {
        match event {
            CollisionEvent::Died { cause } => death = Some(cause),
            other => apply_collision(state, other, tuning),
        }
    }

    // Lives earned this tick count before the death is charged
    state.award_extra_lives(&tuning.extra_lives);
    if let Some(cause) = death {
        lose_life(state, cause, tuning);
    }

    state.normalize_order();

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver {
            score: state.score,
            tier: state.player.tier,
            elapsed: state.elapsed,
        });
        log::info!(
            "Game over: score {} at tier {} after {:.1}s",
            state.score,
            state.player.tier,
            state.elapsed
        );
        return Some(LoopCommand::Stop);
    }

    None
}

fn apply_collision(state: &mut SimulationState, event: CollisionEvent, tuning: &Tuning) {
    match event {
        CollisionEvent::Eaten { class, points, .. } => {
            state.score += points;
            state.events.push(GameEvent::FishEaten { class, points });
            if let Some(tier) = state.player.record_eat(tuning) {
                state.events.push(GameEvent::TierUp { tier });
                log::info!("Tier up: {} after {} fish", tier, state.player.eaten_count);
            }
        }
        CollisionEvent::TailBitten { points, .. } => {
            state.score += points;
            state.events.push(GameEvent::TailBitten { points });
        }
        CollisionEvent::SeahorseCollected { points, extra_life, .. } => {
            state.score += points;
            if extra_life {
                state.lives += 1;
            }
            state.events.push(GameEvent::SeahorseCollected { points, extra_life });
        }
        CollisionEvent::Died { cause } => lose_life(state, cause, tuning),
    }
}

fn lose_life(state: &mut SimulationState, cause: DeathCause, tuning: &Tuning) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        cause,
        lives_left: state.lives,
    });
    log::info!("Life lost to {:?} ({} left)", cause, state.lives);
    if state.lives > 0 {
        state.player.respawn(tuning);
    }
}
