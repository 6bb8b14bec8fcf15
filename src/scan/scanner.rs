//! The streaming detection pipeline
//!
//! `AudioScanner` owns every piece of detector state, so independent
//! instances can run side by side (and unit tests can run scenarios in
//! parallel). Samples flow through decorrelation, level tracking,
//! normalization, window summing and peak extraction in strict order within
//! one sample tick; the bell bandpass runs alongside on the normalized
//! stream, and the classifier fires every 100 ms of audio time.

use crate::config::{ScanConfig, Sensitivity};
use crate::constants::{
    ANALYSIS_INTERVAL, INITIAL_DECORRELATED_LEVEL, MIN_DECORRELATED_LEVEL, NORMALIZATION_LEVEL,
    SAMPLE_CLAMP, SAMPLES_PER_DAY, THRESHOLD_DISPLAY_INTERVAL,
};
use crate::error::{Result, ScanError};
use crate::flags::{Detections, ScanFlags};
use crate::scan::classifier::Classifier;
use crate::scan::format_timestamp;
use crate::scan::peak::{Peak, PeakBuffer};
use crate::scan::threshold::AdaptiveThreshold;
use crate::signal_processing::{bandpass, Biquad, Decorrelator, LevelTracker, SlidingWindow};

/// Streaming knock/bell detector over 16 kHz mono PCM.
///
/// Feed batches of any size to [`scan`](AudioScanner::scan); batching has
/// no effect on what is detected, only on how coarsely detections are
/// attributed to batches.
pub struct AudioScanner {
    config: ScanConfig,
    decorrelator: Decorrelator,
    input_level: LevelTracker,
    window: SlidingWindow,
    bell_filter: Biquad,
    bell_level: LevelTracker,
    peaks: PeakBuffer,
    threshold: AdaptiveThreshold,
    classifier: Classifier,
    current_peak: Peak,
    peak_open: bool,
    sample_index: u64,
}

impl AudioScanner {
    /// Build a scanner, validating the configuration and designing the bell
    /// bandpass from it.
    pub fn new(config: &ScanConfig) -> Result<Self> {
        if config.knock.min_span_samples >= config.knock.max_span_samples {
            return Err(ScanError::Config(format!(
                "knock min_span_samples {} must be below max_span_samples {}",
                config.knock.min_span_samples, config.knock.max_span_samples
            )));
        }
        if config.knock.max_peak_width <= 0 {
            return Err(ScanError::Config(format!(
                "knock max_peak_width {} must be positive",
                config.knock.max_peak_width
            )));
        }
        if config.threshold.initial <= 0.0 {
            return Err(ScanError::Config(format!(
                "initial peak threshold {} must be positive",
                config.threshold.initial
            )));
        }

        let coefficients = bandpass(
            config.bell.frequency_hz,
            config.bell.q,
            crate::constants::SAMPLING_RATE,
        )?;

        Ok(Self {
            decorrelator: Decorrelator::new(),
            input_level: LevelTracker::new(INITIAL_DECORRELATED_LEVEL, MIN_DECORRELATED_LEVEL),
            window: SlidingWindow::new(),
            bell_filter: Biquad::new(&coefficients, config.bell.gain),
            bell_level: LevelTracker::new(0.0, 0.0),
            peaks: PeakBuffer::new(),
            threshold: AdaptiveThreshold::new(config.threshold.initial),
            classifier: Classifier::new(config.knock.clone()),
            current_peak: Peak::default(),
            peak_open: false,
            sample_index: 0,
            config: config.clone(),
        })
    }

    /// Restore the just-constructed state. Equivalent to building a fresh
    /// scanner from the same configuration.
    pub fn reset(&mut self) {
        self.decorrelator.reset();
        self.input_level.reset();
        self.window.reset();
        self.bell_filter.reset();
        self.bell_level.reset();
        self.peaks.clear();
        self.threshold.reset();
        self.current_peak = Peak::default();
        self.peak_open = false;
        self.sample_index = 0;
    }

    /// Process a batch of samples and report events observed during it.
    ///
    /// When any `OUTP_*` flag is set, the corresponding intermediate value
    /// is appended to `taps` for every input sample, taps interleaved in
    /// flag-value order. Callers wanting tighter event timestamps should
    /// pass smaller batches; an event refers to anywhere in its batch.
    pub fn scan(
        &mut self,
        samples: &[i16],
        mut taps: Option<&mut Vec<i16>>,
        flags: ScanFlags,
    ) -> Detections {
        let sensitivity = Sensitivity::for_flags(flags);
        let mut detections = Detections::empty();

        for &input in samples {
            let decorrelated = self.decorrelator.process(input);

            if let Some(out) = taps.as_mut() {
                if flags.contains(ScanFlags::OUTP_DECORR_AUDIO) {
                    out.push(decorrelated);
                }
            }

            let input_level = self.input_level.update(f32::from(decorrelated).abs());

            if let Some(out) = taps.as_mut() {
                if flags.contains(ScanFlags::OUTP_DECORR_LEVEL) {
                    out.push(input_level as i16);
                }
            }

            // Normalize to the target average magnitude so downstream
            // thresholds are independent of the acoustic environment. The
            // level estimate can sag far below a loud onset, so the result
            // must be clipped.
            let normalized = (f32::from(decorrelated) / input_level
                * NORMALIZATION_LEVEL as f32)
                .clamp(-SAMPLE_CLAMP, SAMPLE_CLAMP);

            if let Some(out) = taps.as_mut() {
                if flags.contains(ScanFlags::OUTP_NORMAL_AUDIO) {
                    out.push(normalized as i16);
                }
            }

            let window_level = self.window.update(normalized.abs() as i16);

            if let Some(out) = taps.as_mut() {
                if flags.contains(ScanFlags::OUTP_WINDOW_LEVEL) {
                    out.push(window_level);
                }
            }

            let filtered = self.bell_filter.process(normalized);

            if let Some(out) = taps.as_mut() {
                if flags.contains(ScanFlags::OUTP_FILTER_AUDIO) {
                    out.push(filtered.clamp(-SAMPLE_CLAMP, SAMPLE_CLAMP) as i16);
                }
            }

            let bell_level = self.bell_level.update(filtered.abs());

            if let Some(out) = taps.as_mut() {
                if flags.contains(ScanFlags::OUTP_FILTER_LEVEL) {
                    out.push(bell_level as i16);
                }
            }

            self.track_peak(window_level, bell_level, sensitivity, flags);

            self.sample_index += 1;

            if self.sample_index % ANALYSIS_INTERVAL == 0 {
                detections |= self.classifier.analyze(
                    &mut self.peaks,
                    self.sample_index,
                    self.bell_level.level(),
                    sensitivity,
                    flags,
                );
                self.threshold.decay();
            }

            if flags.contains(ScanFlags::DISP_THRESHOLDS)
                && self.sample_index % THRESHOLD_DISPLAY_INTERVAL == 0
            {
                log::debug!(
                    "peak threshold = {:.2} base, {:.2} actual",
                    self.threshold.baseline(),
                    self.threshold.baseline() * sensitivity.threshold_scaling
                );
            }

            // The sample index runs on a 24-hour loop, reduced only while
            // nothing is in flight so no time comparison straddles the wrap.
            if self.sample_index > SAMPLES_PER_DAY && self.peaks.is_empty() && !self.peak_open {
                self.sample_index %= SAMPLES_PER_DAY;
            }
        }

        detections
    }

    /// Track contiguous positive excursions of the windowed level. The
    /// recorded time follows the running maximum, so the classifier
    /// measures spacing between transient maxima rather than onsets.
    fn track_peak(
        &mut self,
        window_level: i16,
        bell_level: f32,
        sensitivity: Sensitivity,
        flags: ScanFlags,
    ) {
        if !self.peak_open && window_level <= 0 {
            return;
        }

        if !self.peak_open {
            self.current_peak = Peak {
                time: self.sample_index,
                height: i32::from(window_level),
                area: i64::from(window_level),
                width: 0,
                filtered_level: bell_level,
                filter_hits: 0,
            };
            self.peak_open = true;
        } else if i32::from(window_level) > self.current_peak.height {
            self.current_peak.time = self.sample_index;
            self.current_peak.height = i32::from(window_level);
        } else if window_level <= 0 {
            self.peak_open = false;
            self.close_peak(sensitivity, flags);
        } else {
            self.current_peak.area += i64::from(window_level);
        }
    }

    /// Apply the adaptive-threshold acceptance to a completed excursion.
    fn close_peak(&mut self, sensitivity: Sensitivity, flags: ScanFlags) {
        if !self
            .threshold
            .accept(self.current_peak.height, sensitivity.threshold_scaling)
        {
            return;
        }

        self.current_peak.width = self.current_peak.area / i64::from(self.current_peak.height);

        if flags.contains(ScanFlags::DISP_PEAKS) {
            log::debug!(
                "peak added, time = {}, height = {}, width = {}, filtered level = {:.2}",
                format_timestamp(self.current_peak.time),
                self.current_peak.height,
                self.current_peak.width,
                self.current_peak.filtered_level,
            );
        }

        self.peaks.push(self.current_peak, flags);
    }

    /// Monotonic sample count (modulo 24 h of audio while idle).
    pub fn sample_index(&self) -> u64 {
        self.sample_index
    }

    /// Number of peaks currently awaiting classification.
    pub fn peak_count(&self) -> usize {
        self.peaks.len()
    }

    /// Current adaptive threshold baseline.
    pub fn peak_threshold(&self) -> f32 {
        self.threshold.baseline()
    }

    /// Times of the buffered peaks, oldest first.
    pub fn peak_times(&self) -> Vec<u64> {
        self.peaks.as_slice().iter().map(|p| p.time).collect()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn set_sample_index(&mut self, index: u64) {
        self.sample_index = index;
    }
}
