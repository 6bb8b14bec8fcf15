//! Numeric constants for the detection pipeline
//!
//! These define the fixed geometry of the transient detector and the decay
//! rates of its level trackers. They are deliberately not configurable: the
//! downstream classification gates were tuned against exactly these values.

/// Audio sample rate in Hz. The detector only operates on 16 kHz mono input.
pub const SAMPLING_RATE: u32 = 16000;

/// Samples between classifier invocations (100 ms of audio time).
pub const ANALYSIS_INTERVAL: u64 = (SAMPLING_RATE / 10) as u64;

/// Sliding window length as a power of two, for shift-based averaging.
pub const WINDOW_BITS: u32 = 8;

/// Sliding window length in samples (16 ms at 16 kHz).
pub const WINDOW_SIZE: usize = 1 << WINDOW_BITS;

/// Target long-term average magnitude of the normalized signal. The
/// windowed level is signed relative to this value.
pub const NORMALIZATION_LEVEL: i32 = 128;

/// Clamp for normalized and filtered samples, slightly inside i16 range.
pub const SAMPLE_CLAMP: f32 = 32760.0;

/// Initial value of the decaying input-level estimate. Starting high keeps
/// the detector quiet until the estimate has adapted to the environment.
pub const INITIAL_DECORRELATED_LEVEL: f32 = 32760.0;

/// Floor for the decaying input-level estimate. The normalizer divides by
/// the estimate, so it must never reach zero.
pub const MIN_DECORRELATED_LEVEL: f32 = 1.0;

/// Per-sample decay factor of both level trackers (time constant 16 ms).
pub const LEVEL_DECAY: f32 = 255.0 / 256.0;

/// Per-sample contribution of the current magnitude to a level tracker.
pub const LEVEL_STEP: f32 = 1.0 / 256.0;

/// Maximum number of buffered peaks awaiting classification.
pub const MAX_NUM_PEAKS: usize = 16;

/// Maximum first-to-third transient span of a knock pattern, in samples
/// (0.75 s). Peaks older than twice this are expired from the buffer.
pub const KNOCK_MAX_SPAN: u64 = 12000;

/// Minimum first-to-third transient span of a knock pattern (0.25 s).
pub const KNOCK_MIN_SPAN: u64 = 4000;

/// Maximum virtual width (area / height) of a knock transient. Wider peaks
/// are sustained sounds, not knocks.
pub const MAX_KNOCK_PEAK_WIDTH: i64 = 512;

/// Window after a peak's recorded time during which bell-band energy is
/// watched, in samples (1 s).
pub const BELL_WATCH_SPAN: u64 = SAMPLING_RATE as u64;

/// Number of 100 ms confirmations required to report a bell. Five hits
/// require the bell energy to persist for roughly half a second.
pub const BELL_CONFIRM_HITS: u32 = 5;

/// Multiplier applied to the threshold baseline on each qualifying peak.
/// Targets roughly one acceptance per second in steady state.
pub const THRESHOLD_BUMP: f32 = 1.01;

/// Multiplier applied to the threshold baseline each analysis tick, about
/// 1% decay per second of audio when quiet.
pub const THRESHOLD_DECAY: f32 = 0.999;

/// Spacing-equality gate for knock triples (max/min interval ratio),
/// normal and high-sensitivity values.
pub const LOW_KNOCK_MAX_RATIO: f32 = 1.1;
pub const HIGH_KNOCK_MAX_RATIO: f32 = 1.2;

/// Scaling from the threshold baseline to the effective acceptance gate.
pub const LOW_THRESHOLD_SCALING: f32 = 1.5;
pub const HIGH_THRESHOLD_SCALING: f32 = 1.25;

/// Fraction of a knock triple's smallest height that any other nearby peak
/// must stay under for the triple to be accepted.
pub const LOW_SPURIOUS_REJECTION_RATIO: f32 = 0.5;
pub const HIGH_SPURIOUS_REJECTION_RATIO: f32 = 0.75;

/// Sample-index reduction period: 24 hours of audio. The index is only
/// reduced while no peaks are buffered and no excursion is open, so no
/// in-flight time comparison can straddle the wrap.
pub const SAMPLES_PER_DAY: u64 = SAMPLING_RATE as u64 * 3600 * 24;

/// Interval between threshold diagnostics under `DISP_THRESHOLDS` (10 s).
pub const THRESHOLD_DISPLAY_INTERVAL: u64 = SAMPLING_RATE as u64 * 10;
