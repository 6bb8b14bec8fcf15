//! Rectangular sliding-window magnitude sum
//!
//! A 256-slot ring over the normalized magnitudes with an incrementally
//! maintained sum, so the per-sample cost is O(1) and there are no taper
//! artifacts. The derived level is the window average minus the
//! normalization target: a sharp positive spike marks a transient.

use crate::constants::{NORMALIZATION_LEVEL, WINDOW_BITS, WINDOW_SIZE};

pub struct SlidingWindow {
    samples: [i16; WINDOW_SIZE],
    index: usize,
    sum: i32,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self {
            samples: [0; WINDOW_SIZE],
            index: 0,
            sum: 0,
        }
    }

    /// Replace the expiring slot with `magnitude` and return the updated
    /// windowed level, signed relative to the normalization target.
    pub fn update(&mut self, magnitude: i16) -> i16 {
        self.sum -= i32::from(self.samples[self.index]);
        self.samples[self.index] = magnitude;
        self.sum += i32::from(magnitude);
        self.index = (self.index + 1) & (WINDOW_SIZE - 1);

        (((self.sum + (WINDOW_SIZE as i32 / 2)) >> WINDOW_BITS) - NORMALIZATION_LEVEL) as i16
    }

    /// Running sum of the window contents.
    pub fn sum(&self) -> i32 {
        self.sum
    }

    pub fn reset(&mut self) {
        self.samples = [0; WINDOW_SIZE];
        self.index = 0;
        self.sum = 0;
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_matches_contents() {
        let mut window = SlidingWindow::new();

        // The incremental sum must equal the actual window contents after
        // every update, including across multiple wraparounds.
        for i in 0..WINDOW_SIZE * 3 {
            window.update((i % 300) as i16);
            let expected: i32 = window.samples.iter().map(|&s| i32::from(s)).sum();
            assert_eq!(window.sum(), expected, "Sum mismatch at step {}", i);
        }
    }

    #[test]
    fn test_level_at_normalization_target_is_zero() {
        let mut window = SlidingWindow::new();

        let mut level = 0;
        for _ in 0..WINDOW_SIZE {
            level = window.update(NORMALIZATION_LEVEL as i16);
        }

        assert_eq!(level, 0);
    }

    #[test]
    fn test_level_sign() {
        let mut window = SlidingWindow::new();

        let mut level = 0;
        for _ in 0..WINDOW_SIZE {
            level = window.update(300);
        }
        assert!(level > 0, "Above-target magnitudes should read positive");

        for _ in 0..WINDOW_SIZE {
            level = window.update(10);
        }
        assert!(level < 0, "Below-target magnitudes should read negative");
    }

    #[test]
    fn test_empty_window_reads_negative_target() {
        let mut window = SlidingWindow::new();
        let level = window.update(0);
        assert_eq!(level, -(NORMALIZATION_LEVEL as i16));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut window = SlidingWindow::new();
        for _ in 0..100 {
            window.update(500);
        }
        window.reset();
        assert_eq!(window.sum(), 0);
        assert_eq!(window.update(0), -(NORMALIZATION_LEVEL as i16));
    }
}
