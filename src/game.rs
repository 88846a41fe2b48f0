//! Mutable game holder
//!
//! Owns the fixed-step loop, the fused input, the seeded RNG and the current
//! [`SimulationState`]. Every state change goes through [`reduce`]; the loop
//! commands it returns are applied here so the loop always matches the phase.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::platform::{FrameScheduler, GameLoop, InputEvent, InputManager, LoopCallbacks, LoopConfig};
use crate::sim::autopilot;
use crate::sim::{Action, Command, GameEvent, GamePhase, LoopCommand, SimulationState, reduce};
use crate::tuning::Tuning;

/// Presentation collaborator; reads state, never mutates it
pub trait Renderer {
    /// Draw `state`; `alpha` is the fraction of a step left in the accumulator
    fn draw(&mut self, state: &SimulationState, alpha: f32);
}

/// Renderer that draws nothing (tests, benchmarks)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _state: &SimulationState, _alpha: f32) {}
}

/// Everything the loop drives: state, RNG, input and presentation
pub struct Session<R> {
    state: SimulationState,
    tuning: Tuning,
    rng: Pcg32,
    input: InputManager,
    renderer: R,
    autopilot: bool,
    /// Loop commands produced by reductions, applied after the current frame
    loop_commands: Vec<LoopCommand>,
    /// Events gathered since the host last drained them
    events: Vec<GameEvent>,
}

impl<R: Renderer> Session<R> {
    fn new(tuning: Tuning, seed: u64, renderer: R) -> Self {
        let mut input = InputManager::with_deadzone(tuning.touch_deadzone);
        input.initialize();
        Self {
            state: SimulationState::menu(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            input,
            renderer,
            autopilot: false,
            loop_commands: Vec::new(),
            events: Vec::new(),
        }
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        let transition = reduce(state, action, &self.tuning, &mut self.rng);
        self.state = transition.state;
        self.events.extend_from_slice(&self.state.events);
        if let Some(command) = transition.loop_command {
            self.loop_commands.push(command);
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: Renderer> LoopCallbacks for Session<R> {
    fn update(&mut self, dt: f64) {
        let steer = if self.autopilot {
            autopilot::steer(&self.state, &self.tuning)
        } else {
            self.input.get_vector()
        };
        let dt = (dt / 1000.0) as f32;
        self.dispatch(Action::Tick { dt, steer });
    }

    fn render(&mut self, alpha: f64) {
        self.renderer.draw(&self.state, alpha as f32);
    }
}

/// The game as seen by a host: lifecycle commands in, frames in, state out
pub struct Game<R, S> {
    game_loop: GameLoop<Session<R>, S>,
}

impl<R: Renderer, S: FrameScheduler> Game<R, S> {
    /// Build a game sitting at the menu; fails if the tuning table is invalid
    pub fn new(tuning: Tuning, seed: u64, renderer: R, scheduler: S) -> Result<Self, String> {
        Self::with_config(tuning, seed, renderer, scheduler, LoopConfig::default())
    }

    pub fn with_config(
        tuning: Tuning,
        seed: u64,
        renderer: R,
        scheduler: S,
        config: LoopConfig,
    ) -> Result<Self, String> {
        tuning.validate()?;
        config.validate()?;
        log::info!("Game initialized with seed: {}", seed);
        let session = Session::new(tuning, seed, renderer);
        Ok(Self {
            game_loop: GameLoop::new(session, scheduler, config),
        })
    }

    /// Issue a lifecycle command; ignored when it does not fit the phase
    pub fn command(&mut self, command: Command) {
        self.game_loop.callbacks_mut().dispatch(Action::Command(command));
        self.apply_loop_commands();
    }

    /// Handle one display frame delivered by the host at `now` (ms)
    pub fn frame(&mut self, now: f64) {
        // The loop skips updates while paused, so the pause key is read here
        if self.game_loop.callbacks_mut().input.take_pause() {
            self.command(Command::TogglePause);
        }
        self.game_loop.frame(now);
        self.apply_loop_commands();
    }

    fn apply_loop_commands(&mut self) {
        let commands = std::mem::take(&mut self.game_loop.callbacks_mut().loop_commands);
        for command in commands {
            match command {
                LoopCommand::Start => self.game_loop.start(),
                LoopCommand::Pause => self.game_loop.pause(),
                LoopCommand::Resume => self.game_loop.resume(),
                LoopCommand::Stop => self.game_loop.stop(),
            }
        }
    }

    /// Forward a raw host input event
    pub fn handle_input(&mut self, event: InputEvent) {
        self.input_mut().handle_event(event);
    }

    pub fn input(&self) -> &InputManager {
        &self.game_loop.callbacks().input
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.game_loop.callbacks_mut().input
    }

    /// Let the built-in steering play instead of the fused input
    pub fn set_autopilot(&mut self, enabled: bool) {
        let session = self.game_loop.callbacks_mut();
        if session.autopilot != enabled {
            log::info!("Autopilot: {}", enabled);
        }
        session.autopilot = enabled;
    }

    pub fn autopilot(&self) -> bool {
        self.game_loop.callbacks().autopilot
    }

    pub fn state(&self) -> &SimulationState {
        self.game_loop.callbacks().state()
    }

    pub fn phase(&self) -> GamePhase {
        self.state().phase
    }

    pub fn score(&self) -> u64 {
        self.state().score
    }

    pub fn tuning(&self) -> &Tuning {
        &self.game_loop.callbacks().tuning
    }

    pub fn renderer(&self) -> &R {
        self.game_loop.callbacks().renderer()
    }

    /// Events produced since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.game_loop.callbacks_mut().events)
    }

    pub fn is_running(&self) -> bool {
        self.game_loop.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.game_loop.is_paused()
    }

    pub fn scheduler(&self) -> &S {
        self.game_loop.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.game_loop.scheduler_mut()
    }

    /// JSON snapshot of the current state for hosts
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        self.state().to_json()
    }

    /// Stop the loop and detach input; safe to call more than once
    pub fn shutdown(&mut self) {
        self.game_loop.stop();
        self.input_mut().destroy();
    }
}
