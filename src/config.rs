//! Configuration for the doorsense detector.
//!
//! The defaults reproduce the tuning the detector shipped with: a 770 Hz
//! doorbell fundamental at Q 100 and a peak threshold that self-adjusts from
//! an initial 30. Most deployments only ever change the bell frequency.
//!
//! ```
//! use doorsense::config::ScanConfig;
//!
//! let mut config = ScanConfig::default();
//! // A different doorbell: measure the "ding" fundamental, not a harmonic.
//! config.bell.frequency_hz = 785.0;
//! ```

use crate::constants::{
    HIGH_KNOCK_MAX_RATIO, HIGH_SPURIOUS_REJECTION_RATIO, HIGH_THRESHOLD_SCALING,
    KNOCK_MAX_SPAN, KNOCK_MIN_SPAN, LOW_KNOCK_MAX_RATIO, LOW_SPURIOUS_REJECTION_RATIO,
    LOW_THRESHOLD_SCALING, MAX_KNOCK_PEAK_WIDTH,
};
use crate::flags::ScanFlags;

/// System-wide detector configuration
///
/// Use `ScanConfig::default()` for the stock tuning.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Bell bandpass filter configuration
    pub bell: BellConfig,
    /// Adaptive peak threshold configuration
    pub threshold: ThresholdConfig,
    /// Knock pattern matching configuration
    pub knock: KnockConfig,
}

/// Bell bandpass filter configuration
///
/// The filter should be a narrow bandpass tuned to the fundamental of the
/// target bell, not a harmonic. Two doorbells measured in the field: 770 Hz
/// (the "ding" of a ding-dong chime) and 785 Hz (a wireless single-tone
/// unit).
#[derive(Debug, Clone)]
pub struct BellConfig {
    /// Fundamental frequency of the target bell in Hz
    pub frequency_hz: f32,
    /// Filter quality factor (higher = narrower resonance)
    pub q: f32,
    /// Gain applied at the resonance peak. With the stock gain of 4.0 a
    /// pure bell tone drives the bell level to about four times the
    /// normalization target, while broadband sound stays well below it.
    pub gain: f32,
}

impl Default for BellConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 770.0,
            q: 100.0,
            gain: 4.0,
        }
    }
}

/// Adaptive peak threshold configuration
#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    /// Starting value of the threshold baseline. The baseline self-adjusts
    /// from here: up 1% per accepted peak, down about 1% per second.
    pub initial: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { initial: 30.0 }
    }
}

/// Knock pattern matching configuration
///
/// A knock is three transients spaced almost equally in time, with the full
/// pattern lasting between `min_span_samples` and `max_span_samples`
/// (0.25 s to 0.75 s stock, covering knocking cadences of roughly 2.7 to
/// 8 Hz).
#[derive(Debug, Clone)]
pub struct KnockConfig {
    /// Minimum first-to-third transient span in samples
    pub min_span_samples: u64,
    /// Maximum first-to-third transient span in samples
    pub max_span_samples: u64,
    /// Maximum virtual width (area / height) of a knock transient
    pub max_peak_width: i64,
}

impl Default for KnockConfig {
    fn default() -> Self {
        Self {
            min_span_samples: KNOCK_MIN_SPAN,
            max_span_samples: KNOCK_MAX_SPAN,
            max_peak_width: MAX_KNOCK_PEAK_WIDTH,
        }
    }
}

/// Classification gates selected by the sensitivity mode
///
/// High sensitivity loosens every gate at the cost of more false positives;
/// it is meant for quiet environments or soft knockers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    /// Maximum ratio between the two knock intervals
    pub max_interval_ratio: f32,
    /// Scaling from the threshold baseline to the acceptance gate
    pub threshold_scaling: f32,
    /// Height fraction other nearby peaks must stay under
    pub spurious_rejection_ratio: f32,
}

impl Sensitivity {
    pub fn normal() -> Self {
        Self {
            max_interval_ratio: LOW_KNOCK_MAX_RATIO,
            threshold_scaling: LOW_THRESHOLD_SCALING,
            spurious_rejection_ratio: LOW_SPURIOUS_REJECTION_RATIO,
        }
    }

    pub fn high() -> Self {
        Self {
            max_interval_ratio: HIGH_KNOCK_MAX_RATIO,
            threshold_scaling: HIGH_THRESHOLD_SCALING,
            spurious_rejection_ratio: HIGH_SPURIOUS_REJECTION_RATIO,
        }
    }

    pub fn for_flags(flags: ScanFlags) -> Self {
        if flags.contains(ScanFlags::HIGH_SENSITIVITY) {
            Self::high()
        } else {
            Self::normal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.bell.frequency_hz, 770.0);
        assert_eq!(config.threshold.initial, 30.0);
        assert_eq!(config.knock.min_span_samples, 4000);
        assert_eq!(config.knock.max_span_samples, 12000);
    }

    #[test]
    fn test_sensitivity_from_flags() {
        assert_eq!(
            Sensitivity::for_flags(ScanFlags::empty()),
            Sensitivity::normal()
        );
        assert_eq!(
            Sensitivity::for_flags(ScanFlags::HIGH_SENSITIVITY),
            Sensitivity::high()
        );
        assert!(Sensitivity::high().max_interval_ratio > Sensitivity::normal().max_interval_ratio);
        assert!(Sensitivity::high().threshold_scaling < Sensitivity::normal().threshold_scaling);
    }
}
