use std::f32::consts::PI;

use crate::constants::SAMPLING_RATE;

/// Duration of a synthetic transient, matching a hard knuckle strike.
pub const PULSE_WIDTH_SECS: f32 = 0.005;

/// Amplitude of synthetic transients: full scale, like a close-by knock
/// hitting the microphone's limit.
pub const PULSE_AMPLITUDE: i16 = i16::MAX;

pub fn seconds_to_samples(secs: f32) -> usize {
    (secs * SAMPLING_RATE as f32) as usize
}

/// Generate silence.
pub fn generate_silence(duration_secs: f32) -> Vec<i16> {
    vec![0; seconds_to_samples(duration_secs)]
}

/// Generate full-scale rectangular transients at the given start times over
/// a silent background.
pub fn generate_pulse_train(pulse_starts_secs: &[f32], total_secs: f32) -> Vec<i16> {
    let mut samples = vec![0i16; seconds_to_samples(total_secs)];
    let width = seconds_to_samples(PULSE_WIDTH_SECS);

    for &start in pulse_starts_secs {
        let begin = seconds_to_samples(start);
        for sample in samples.iter_mut().skip(begin).take(width) {
            *sample = PULSE_AMPLITUDE;
        }
    }

    samples
}

/// Generate a three-transient knock pattern: the first strike at
/// `start_secs`, the others after `interval1_secs` and `interval2_secs`.
pub fn generate_knock(
    start_secs: f32,
    interval1_secs: f32,
    interval2_secs: f32,
    total_secs: f32,
) -> Vec<i16> {
    generate_pulse_train(
        &[
            start_secs,
            start_secs + interval1_secs,
            start_secs + interval1_secs + interval2_secs,
        ],
        total_secs,
    )
}

/// Generate a pure tone.
pub fn generate_tone(frequency_hz: f32, duration_secs: f32, amplitude: f32) -> Vec<i16> {
    (0..seconds_to_samples(duration_secs))
        .map(|i| {
            let t = i as f32 / SAMPLING_RATE as f32;
            (amplitude * (2.0 * PI * frequency_hz * t).sin()) as i16
        })
        .collect()
}

/// Generate a bell strike: a transient immediately followed by a decaying
/// burst of the bell's fundamental.
pub fn generate_bell_strike(
    start_secs: f32,
    frequency_hz: f32,
    ring_secs: f32,
    amplitude: f32,
    total_secs: f32,
) -> Vec<i16> {
    let mut samples = generate_pulse_train(&[start_secs], total_secs);

    let ring_start = seconds_to_samples(start_secs + PULSE_WIDTH_SECS);
    let tone = generate_tone(frequency_hz, ring_secs, amplitude);

    for (i, &value) in tone.iter().enumerate() {
        if let Some(sample) = samples.get_mut(ring_start + i) {
            *sample = value;
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_train_placement() {
        let signal = generate_pulse_train(&[0.5], 1.0);

        assert_eq!(signal.len(), 16000);
        assert_eq!(signal[7999], 0);
        assert_eq!(signal[8000], PULSE_AMPLITUDE);
        assert_eq!(signal[8079], PULSE_AMPLITUDE);
        assert_eq!(signal[8080], 0);
    }

    #[test]
    fn test_knock_has_three_pulses() {
        let signal = generate_knock(1.0, 0.15, 0.15, 2.0);

        let transitions = signal
            .windows(2)
            .filter(|w| w[0] == 0 && w[1] == PULSE_AMPLITUDE)
            .count();
        assert_eq!(transitions, 3);
    }

    #[test]
    fn test_tone_amplitude_and_length() {
        let tone = generate_tone(770.0, 1.0, 8000.0);

        assert_eq!(tone.len(), 16000);
        let peak = tone.iter().map(|&s| i32::from(s).abs()).max().unwrap();
        assert!(peak > 7800 && peak <= 8000, "Peak {} out of range", peak);
    }

    #[test]
    fn test_bell_strike_layout() {
        let signal = generate_bell_strike(1.0, 770.0, 0.5, 8000.0, 2.0);

        assert_eq!(signal.len(), 32000);
        assert_eq!(signal[16000], PULSE_AMPLITUDE);
        // Ring region contains the tone, not the pulse level.
        let ring = &signal[16100..24000];
        assert!(ring.iter().any(|&s| s > 4000));
        assert!(ring.iter().all(|&s| s < 8100));
        // Past the ring, silence again.
        assert!(signal[24200..].iter().all(|&s| s == 0));
    }
}
