//! Time-driven difficulty
//!
//! Difficulty is a pure function of elapsed run time, so it stays identical
//! regardless of frame rate or how a run was paused.

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::tuning::DifficultyTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Ramp position after the curve, 0 (start) ..= 1 (capped)
    pub level: f32,
    /// Multiplier on spawn frequency
    pub spawn_rate: f32,
    /// Multiplier on spawned entity speed
    pub speed: f32,
}

impl Default for DifficultyState {
    fn default() -> Self {
        Self::initial(&DifficultyTuning::default())
    }
}

impl DifficultyState {
    pub fn at(elapsed: f32, tuning: &DifficultyTuning) -> Self {
        let t = if tuning.ramp_duration > 0.0 {
            (elapsed / tuning.ramp_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let level = tuning.curve.apply(t);
        Self {
            level,
            spawn_rate: lerp(tuning.base_spawn_rate, tuning.max_spawn_rate, level),
            speed: lerp(tuning.base_speed, tuning.max_speed, level),
        }
    }

    /// Difficulty at the very start of a run
    pub fn initial(tuning: &DifficultyTuning) -> Self {
        Self::at(0.0, tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DifficultyCurve;
    use proptest::prelude::*;

    #[test]
    fn test_ramp_endpoints() {
        let tuning = DifficultyTuning::default();
        let start = DifficultyState::initial(&tuning);
        assert_eq!(start.level, 0.0);
        assert_eq!(start.spawn_rate, tuning.base_spawn_rate);
        assert_eq!(start.speed, tuning.base_speed);

        let end = DifficultyState::at(tuning.ramp_duration, &tuning);
        assert_eq!(end.spawn_rate, tuning.max_spawn_rate);
        assert_eq!(end.speed, tuning.max_speed);

        // Capped past the ramp
        assert_eq!(DifficultyState::at(tuning.ramp_duration * 10.0, &tuning), end);
    }

    #[test]
    fn test_halfway_linear() {
        let tuning = DifficultyTuning::default();
        let mid = DifficultyState::at(tuning.ramp_duration / 2.0, &tuning);
        assert!((mid.level - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_monotonic(a in 0.0f32..1_000.0, b in 0.0f32..1_000.0, curve in 0usize..4) {
            let curve = [
                DifficultyCurve::Linear,
                DifficultyCurve::EaseIn,
                DifficultyCurve::EaseOut,
                DifficultyCurve::SmoothStep,
            ][curve];
            let tuning = DifficultyTuning { curve, ..DifficultyTuning::default() };
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let early = DifficultyState::at(early, &tuning);
            let late = DifficultyState::at(late, &tuning);
            prop_assert!(late.level >= early.level);
            prop_assert!(late.spawn_rate >= early.spawn_rate);
            prop_assert!(late.speed >= early.speed);
            prop_assert!(late.spawn_rate <= tuning.max_spawn_rate + 1e-5);
        }
    }
}
