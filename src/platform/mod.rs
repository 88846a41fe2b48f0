//! Platform abstraction layer
//!
//! Everything the simulation needs from a host, expressed without any UI
//! toolkit:
//! - Input events (keyboard, touch) fused into one direction vector
//! - Frame scheduling and time
//! - The fixed timestep loop driven by those frames

pub mod game_loop;
pub mod input;
pub mod scheduler;

pub use game_loop::{GameLoop, LoopCallbacks, LoopConfig, clamp_frame_time};
pub use input::{InputEvent, InputManager, InputSource, Key, KeyState};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
