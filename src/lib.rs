//! Reef Rush - A grow-by-eating arcade fish game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, game state)
//! - `platform`: Host abstraction (input fusion, frame scheduling, fixed-step loop)
//! - `tuning`: Data-driven game balance
//! - `game`: Mutable holder wiring loop, input and simulation together

pub mod game;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use game::{Game, Renderer};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const FIXED_TIMESTEP_MS: f64 = 1000.0 / 60.0;
    /// Longest wall-clock frame fed into the accumulator (stalled tab guard)
    pub const MAX_FRAME_TIME_MS: f64 = 250.0;

    /// Touch vectors shorter than this fall back to keyboard input
    pub const TOUCH_DEADZONE: f32 = 0.15;

    /// Default world dimensions (pixels)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Extra distance past the edge before an entity is culled
    pub const OFFSCREEN_MARGIN: f32 = 40.0;

    /// Player growth stages
    pub const MIN_TIER: u8 = 1;
    pub const MAX_TIER: u8 = 5;

    /// Shark tail geometry, as fractions of the shark radius
    pub const SHARK_TAIL_OFFSET: f32 = 0.9;
    pub const SHARK_TAIL_RADIUS: f32 = 0.45;
}

/// True when two circles overlap (touching edges do not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        // Exactly touching is not an overlap
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 1.0, Vec2::new(3.0, 3.0), 1.0));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(1.0, 3.0, 0.0), 1.0);
        assert_eq!(lerp(1.0, 3.0, 1.0), 3.0);
        assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
    }
}
