//! Synthetic 16 kHz mono test signals shared by the integration tests.

#![allow(dead_code)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f32::consts::PI;

pub const SAMPLE_RATE: u32 = 16000;

/// Duration of a synthetic transient (a hard knuckle strike).
pub const PULSE_WIDTH_SECS: f32 = 0.005;

pub fn seconds(secs: f32) -> usize {
    (secs * SAMPLE_RATE as f32) as usize
}

/// Full-scale rectangular transients at the given start times over silence.
pub fn pulse_train(pulse_starts_secs: &[f32], total_secs: f32) -> Vec<i16> {
    let mut samples = vec![0i16; seconds(total_secs)];
    let width = seconds(PULSE_WIDTH_SECS);

    for &start in pulse_starts_secs {
        let begin = seconds(start);
        for sample in samples.iter_mut().skip(begin).take(width) {
            *sample = i16::MAX;
        }
    }

    samples
}

/// A transient at `start_secs` immediately followed by a burst of the
/// bell's fundamental.
pub fn bell_strike(
    start_secs: f32,
    frequency_hz: f32,
    ring_secs: f32,
    amplitude: f32,
    total_secs: f32,
) -> Vec<i16> {
    let mut samples = pulse_train(&[start_secs], total_secs);

    let ring_start = seconds(start_secs + PULSE_WIDTH_SECS);
    for i in 0..seconds(ring_secs) {
        let t = i as f32 / SAMPLE_RATE as f32;
        let value = (amplitude * (2.0 * PI * frequency_hz * t).sin()) as i16;
        if let Some(sample) = samples.get_mut(ring_start + i) {
            *sample = value;
        }
    }

    samples
}

/// Seeded Gaussian white noise at the given RMS amplitude.
pub fn white_noise(duration_secs: f32, rms: f32, seed: u64) -> Vec<i16> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, rms).unwrap();

    (0..seconds(duration_secs))
        .map(|_| normal.sample(&mut rng).clamp(-32768.0, 32767.0) as i16)
        .collect()
}
