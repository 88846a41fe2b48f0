//! Headless runner: plays one autopilot game and logs the HUD
//!
//! Usage: `reef-rush [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
use reef_rush::{
    Game, Renderer, Tuning,
    platform::ManualScheduler,
    sim::{Command, GameEvent, SimulationState},
};

/// Frames per simulated second of the fake display
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up after ten simulated minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: usize = 60 * 60 * 10;

/// Logs a HUD line every few simulated seconds
#[cfg(not(target_arch = "wasm32"))]
struct LogHud {
    last_logged: u64,
    every_ticks: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl Renderer for LogHud {
    fn draw(&mut self, state: &SimulationState, _alpha: f32) {
        if state.time_ticks >= self.last_logged + self.every_ticks {
            self.last_logged = state.time_ticks;
            log::info!(
                "t={:>6.1}s score={:>7} lives={} tier={} eaten={} entities={} spawn_rate={:.2}",
                state.elapsed,
                state.score,
                state.lives,
                state.tier(),
                state.eaten_count(),
                state.entities.len(),
                state.difficulty.spawn_rate
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: Option<&str>) -> Result<Tuning, String> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path, e))?;
            Tuning::from_json(&json).map_err(|e| format!("parsing {}: {}", path, e))
        }
        None => Ok(Tuning::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match args.first() {
        Some(s) => s.parse::<u64>().map_err(|e| format!("invalid seed {:?}: {}", s, e))?,
        None => 0xF15F,
    };
    let tuning = load_tuning(args.get(1).map(String::as_str))?;

    let hud = LogHud {
        last_logged: 0,
        every_ticks: 60 * 5,
    };
    let mut game = Game::new(tuning, seed, hud, ManualScheduler::new())?;
    game.set_autopilot(true);
    game.command(Command::Start);

    for _ in 0..MAX_FRAMES {
        if !game.is_running() {
            break;
        }
        game.scheduler_mut().take_frame();
        let now = game.scheduler_mut().advance(FRAME_MS);
        game.frame(now);

        for event in game.drain_events() {
            match event {
                GameEvent::TierUp { tier } => log::info!("Grew to tier {}", tier),
                GameEvent::ExtraLife { threshold } => log::info!("Extra life at {}", threshold),
                GameEvent::LifeLost { cause, lives_left } => {
                    log::info!("Lost a life to {:?}, {} left", cause, lives_left)
                }
                _ => {}
            }
        }
    }

    let state = game.state();
    log::info!(
        "Finished ({:?}): score {} tier {} after {:.1}s",
        state.phase,
        state.score,
        state.tier(),
        state.elapsed
    );
    game.shutdown();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Reef Rush (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive `reef_rush::Game` directly; nothing to run here
}
