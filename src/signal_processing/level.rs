//! Exponentially decaying magnitude estimate
//!
//! Both the input-level estimate feeding the normalizer and the bell-band
//! level estimate use the same recurrence with a 256-sample time constant
//! (16 ms at 16 kHz).

use crate::constants::{LEVEL_DECAY, LEVEL_STEP};

/// Decaying average of a signal's absolute magnitude.
pub struct LevelTracker {
    level: f32,
    initial: f32,
    floor: f32,
}

impl LevelTracker {
    /// Create a tracker starting at `initial` and never falling below
    /// `floor`. The normalizer divides by its tracker, so that one uses a
    /// positive floor; the bell tracker starts and may decay to zero.
    pub fn new(initial: f32, floor: f32) -> Self {
        Self {
            level: initial,
            initial,
            floor,
        }
    }

    /// Fold the next magnitude into the estimate and return it.
    pub fn update(&mut self, magnitude: f32) -> f32 {
        self.level = (self.level * LEVEL_DECAY + magnitude * LEVEL_STEP).max(self.floor);
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_constant_magnitude() {
        let mut tracker = LevelTracker::new(0.0, 0.0);

        for _ in 0..5000 {
            tracker.update(1000.0);
        }

        assert!(
            (tracker.level() - 1000.0).abs() < 1.0,
            "Expected convergence to 1000, got {}",
            tracker.level()
        );
    }

    #[test]
    fn test_decays_on_silence() {
        let mut tracker = LevelTracker::new(32760.0, 1.0);

        // One time constant of silence decays to ~1/e of the start.
        for _ in 0..256 {
            tracker.update(0.0);
        }
        let after_one_tc = tracker.level();
        assert!(after_one_tc < 32760.0 * 0.40 && after_one_tc > 32760.0 * 0.33);
    }

    #[test]
    fn test_floor_holds_under_prolonged_silence() {
        let mut tracker = LevelTracker::new(32760.0, 1.0);

        for _ in 0..100_000 {
            tracker.update(0.0);
        }

        assert_eq!(tracker.level(), 1.0);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut tracker = LevelTracker::new(32760.0, 1.0);
        tracker.update(5.0);
        tracker.update(5.0);
        tracker.reset();
        assert_eq!(tracker.level(), 32760.0);
    }
}
