//! Fixed timestep game loop
//!
//! Wall-clock frames feed an accumulator that is drained in constant
//! `fixed_timestep` slices, so simulation results do not depend on the
//! display refresh rate. Rendering happens once per frame with the leftover
//! fraction as an interpolation factor.

use serde::{Deserialize, Serialize};

use super::scheduler::{FrameHandle, FrameScheduler};
use crate::consts::{FIXED_TIMESTEP_MS, MAX_FRAME_TIME_MS};

/// Loop timing configuration (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub fixed_timestep: f64,
    /// Upper bound on the wall time a single frame may contribute
    pub max_frame_time: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: FIXED_TIMESTEP_MS,
            max_frame_time: MAX_FRAME_TIME_MS,
        }
    }
}

impl LoopConfig {
    /// Reject timings the accumulator cannot drain
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(format!("fixed timestep must be positive, got {}", self.fixed_timestep));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            return Err(format!("max frame time must be positive, got {}", self.max_frame_time));
        }
        Ok(())
    }

    /// Replace non-positive or non-finite timings with the defaults
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let normalize = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        };
        let config = Self {
            fixed_timestep: normalize(self.fixed_timestep, defaults.fixed_timestep),
            max_frame_time: normalize(self.max_frame_time, defaults.max_frame_time),
        };
        if config != self {
            log::warn!("Loop config {:?} normalized to {:?}", self, config);
        }
        config
    }
}

/// Work the loop drives each frame
pub trait LoopCallbacks {
    /// Advance the simulation by exactly `dt` milliseconds
    fn update(&mut self, dt: f64);
    /// Present the current state; `alpha` in [0, 1) is the leftover step fraction
    fn render(&mut self, alpha: f64);
}

/// Clamp a measured frame time so a stalled frame cannot inject a huge burst
#[inline]
pub fn clamp_frame_time(frame_time: f64, max_frame_time: f64) -> f64 {
    frame_time.min(max_frame_time)
}

/// Fixed-step loop with start/stop/pause/resume lifecycle
pub struct GameLoop<C, S> {
    callbacks: C,
    scheduler: S,
    config: LoopConfig,
    running: bool,
    paused: bool,
    accumulator: f64,
    last_time: f64,
    pending: Option<FrameHandle>,
}

impl<C: LoopCallbacks, S: FrameScheduler> GameLoop<C, S> {
    /// Invalid timings in `config` fall back to the defaults
    pub fn new(callbacks: C, scheduler: S, config: LoopConfig) -> Self {
        Self {
            callbacks,
            scheduler,
            config: config.normalized(),
            running: false,
            paused: false,
            accumulator: 0.0,
            last_time: 0.0,
            pending: None,
        }
    }

    /// Begin scheduling frames; no-op while already running
    pub fn start(&mut self) {
        if self.running {
            log::debug!("GameLoop::start ignored (already running)");
            return;
        }
        self.running = true;
        self.paused = false;
        self.accumulator = 0.0;
        self.last_time = self.scheduler.now();
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Halt scheduling; safe from any state
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.running = false;
        self.paused = false;
        self.accumulator = 0.0;
    }

    pub fn pause(&mut self) {
        if self.running && !self.paused {
            self.paused = true;
        } else {
            log::debug!("GameLoop::pause ignored (running={}, paused={})", self.running, self.paused);
        }
    }

    pub fn resume(&mut self) {
        if self.running && self.paused {
            self.paused = false;
        } else {
            log::debug!("GameLoop::resume ignored (running={}, paused={})", self.running, self.paused);
        }
    }

    /// Handle one delivered display frame at time `now`
    pub fn frame(&mut self, now: f64) {
        if !self.running {
            return;
        }
        self.pending = None;

        // A clock that steps backwards contributes nothing
        let frame_time = clamp_frame_time((now - self.last_time).max(0.0), self.config.max_frame_time);
        self.last_time = now;

        let step = self.config.fixed_timestep;
        if !self.paused {
            self.accumulator += frame_time;
            while self.accumulator >= step {
                self.callbacks.update(step);
                self.accumulator -= step;
            }
        }

        self.callbacks.render(self.accumulator / step);
        self.pending = Some(self.scheduler.request_frame());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> LoopConfig {
        self.config
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::scheduler::ManualScheduler;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        updates: Vec<f64>,
        alphas: Vec<f64>,
    }

    impl LoopCallbacks for Recorder {
        fn update(&mut self, dt: f64) {
            self.updates.push(dt);
        }

        fn render(&mut self, alpha: f64) {
            self.alphas.push(alpha);
        }
    }

    fn new_loop() -> GameLoop<Recorder, ManualScheduler> {
        let config = LoopConfig {
            fixed_timestep: 10.0,
            max_frame_time: 100.0,
        };
        GameLoop::new(Recorder::default(), ManualScheduler::new(), config)
    }

    /// Advance the manual clock and deliver the pending frame
    fn step(game_loop: &mut GameLoop<Recorder, ManualScheduler>, ms: f64) {
        let now = game_loop.scheduler_mut().advance(ms);
        if game_loop.scheduler_mut().take_frame().is_some() {
            game_loop.frame(now);
        }
    }

    #[test]
    fn test_default_config() {
        let config = LoopConfig::default();
        assert!((config.fixed_timestep - 1000.0 / 60.0).abs() < 1e-9);
        assert!(config.max_frame_time > config.fixed_timestep);
    }

    #[test]
    fn test_clamp_frame_time() {
        assert_eq!(clamp_frame_time(5.0, 100.0), 5.0);
        assert_eq!(clamp_frame_time(100.0, 100.0), 100.0);
        assert_eq!(clamp_frame_time(5000.0, 100.0), 100.0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut game_loop = new_loop();
        assert!(!game_loop.is_running());
        game_loop.start();
        assert!(game_loop.is_running());
        game_loop.start();
        assert!(game_loop.is_running());
        assert_eq!(game_loop.scheduler().pending_frames(), 1);
    }

    #[test]
    fn test_fixed_steps_and_alpha() {
        let mut game_loop = new_loop();
        game_loop.start();
        step(&mut game_loop, 25.0);
        assert_eq!(game_loop.callbacks().updates, vec![10.0, 10.0]);
        assert!((game_loop.callbacks().alphas[0] - 0.5).abs() < 1e-9);

        step(&mut game_loop, 5.0);
        assert_eq!(game_loop.callbacks().updates.len(), 3);
        assert!(game_loop.callbacks().alphas[1].abs() < 1e-9);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut game_loop = new_loop();
        game_loop.start();
        step(&mut game_loop, 10_000.0);
        // 100ms max / 10ms step
        assert_eq!(game_loop.callbacks().updates.len(), 10);
    }

    #[test]
    fn test_backwards_clock_adds_nothing() {
        let mut game_loop = new_loop();
        game_loop.scheduler_mut().set_now(500.0);
        game_loop.start();
        game_loop.scheduler_mut().set_now(400.0);
        game_loop.scheduler_mut().take_frame();
        game_loop.frame(400.0);
        assert!(game_loop.callbacks().updates.is_empty());
        assert_eq!(game_loop.callbacks().alphas.len(), 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut game_loop = new_loop();

        // Not running: no-ops
        game_loop.pause();
        assert!(!game_loop.is_paused());
        game_loop.resume();
        assert!(!game_loop.is_paused());

        game_loop.start();
        game_loop.pause();
        assert!(game_loop.is_paused());

        step(&mut game_loop, 50.0);
        assert!(game_loop.callbacks().updates.is_empty());
        // Paused frames still render and keep scheduling
        assert_eq!(game_loop.callbacks().alphas.len(), 1);
        assert_eq!(game_loop.scheduler().pending_frames(), 1);

        game_loop.resume();
        assert!(!game_loop.is_paused());
        step(&mut game_loop, 10.0);
        // No catch-up burst for the paused time
        assert_eq!(game_loop.callbacks().updates.len(), 1);
    }

    #[test]
    fn test_stop_clears_flags_and_pending_frame() {
        let mut game_loop = new_loop();
        game_loop.stop();
        assert!(!game_loop.is_running());

        game_loop.start();
        game_loop.pause();
        game_loop.stop();
        assert!(!game_loop.is_running());
        assert!(!game_loop.is_paused());
        assert_eq!(game_loop.scheduler().pending_frames(), 0);

        // Stray frame after stop does nothing
        game_loop.frame(1_000.0);
        assert!(game_loop.callbacks().alphas.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected_and_normalized() {
        let zero = LoopConfig {
            fixed_timestep: 0.0,
            max_frame_time: 100.0,
        };
        assert!(zero.validate().is_err());
        assert!(LoopConfig { fixed_timestep: -5.0, ..zero }.validate().is_err());
        assert!(LoopConfig { fixed_timestep: f64::NAN, ..zero }.validate().is_err());
        assert!(LoopConfig { fixed_timestep: 10.0, max_frame_time: 0.0 }.validate().is_err());
        assert!(LoopConfig::default().validate().is_ok());

        let normalized = zero.normalized();
        assert_eq!(normalized.fixed_timestep, FIXED_TIMESTEP_MS);
        assert_eq!(normalized.max_frame_time, 100.0);
    }

    #[test]
    fn test_zero_timestep_frame_terminates() {
        let config = LoopConfig {
            fixed_timestep: 0.0,
            max_frame_time: 100.0,
        };
        let mut game_loop = GameLoop::new(Recorder::default(), ManualScheduler::new(), config);
        assert_eq!(game_loop.config().fixed_timestep, FIXED_TIMESTEP_MS);
        game_loop.start();
        step(&mut game_loop, 20.0);
        assert_eq!(game_loop.callbacks().updates.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_clamp_frame_time(f in 0.0f64..10_000.0, max in 1.0f64..1_000.0) {
            let clamped = clamp_frame_time(f, max);
            if f <= max {
                prop_assert_eq!(clamped, f);
            } else {
                prop_assert_eq!(clamped, max);
            }
            prop_assert_eq!(clamp_frame_time(max, max), max);
        }

        #[test]
        fn prop_update_count_independent_of_frame_split(frames in proptest::collection::vec(1.0f64..30.0, 1..40)) {
            // Same total time delivered as many small frames or as the sum
            let total: f64 = frames.iter().sum();
            let mut split = new_loop();
            split.start();
            for f in &frames {
                step(&mut split, *f);
            }
            let updates = split.callbacks().updates.len() as f64;
            let expected = (total / 10.0).floor();
            prop_assert!((updates - expected).abs() <= 1.0);
        }
    }
}
