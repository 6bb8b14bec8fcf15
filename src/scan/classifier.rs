//! Periodic peak classification: knock patterns and bell confirmation
//!
//! Runs once per 100 ms of audio time. Calling it on every tick, not just
//! when peaks were added, lets the post-roll window after the last transient
//! be observed and lets expired peaks drain from the buffer.
//!
//! A detection of either kind clears the whole buffer, so a knock and a
//! bell can never be raised from the same peak set; the knock search runs
//! first and wins ties.

use crate::config::{KnockConfig, Sensitivity};
use crate::constants::{BELL_CONFIRM_HITS, BELL_WATCH_SPAN, SAMPLING_RATE};
use crate::flags::{Detections, ScanFlags};
use crate::scan::format_timestamp;
use crate::scan::peak::PeakBuffer;

pub struct Classifier {
    knock: KnockConfig,
}

impl Classifier {
    pub fn new(knock: KnockConfig) -> Self {
        Self { knock }
    }

    /// Classify the buffered peaks at an analysis tick.
    pub fn analyze(
        &self,
        peaks: &mut PeakBuffer,
        sample_index: u64,
        bell_level: f32,
        sensitivity: Sensitivity,
        flags: ScanFlags,
    ) -> Detections {
        self.expire(peaks, sample_index);

        if self.search_knock(peaks, sample_index, sensitivity, flags) {
            peaks.clear();
            return Detections::KNOCK;
        }

        if self.confirm_bell(peaks, sample_index, bell_level, flags) {
            peaks.clear();
            return Detections::BELL;
        }

        Detections::empty()
    }

    /// Drop peaks too old to participate in any future pattern.
    fn expire(&self, peaks: &mut PeakBuffer, sample_index: u64) {
        while !peaks.is_empty()
            && peaks.as_slice()[0].time + self.knock.max_span_samples * 2 < sample_index
        {
            peaks.remove(0);
        }
    }

    /// Look for three near-equidistant transients in the knocking cadence
    /// band. O(n³) over the buffer, but n never exceeds 16.
    fn search_knock(
        &self,
        peaks: &PeakBuffer,
        sample_index: u64,
        sensitivity: Sensitivity,
        flags: ScanFlags,
    ) -> bool {
        let buffer = peaks.as_slice();
        let n = buffer.len();

        for p1 in 0..n.saturating_sub(2) {
            for p2 in p1 + 1..n - 1 {
                for p3 in p2 + 1..n {
                    let span = buffer[p3].time - buffer[p1].time;

                    if span <= self.knock.min_span_samples || span >= self.knock.max_span_samples {
                        continue;
                    }
                    if buffer[p1].width >= self.knock.max_peak_width
                        || buffer[p2].width >= self.knock.max_peak_width
                        || buffer[p3].width >= self.knock.max_peak_width
                    {
                        continue;
                    }
                    // Half a span of post-roll must have passed with no
                    // further detection activity before the pattern counts
                    // as closed.
                    if buffer[p3].time + span / 2 >= sample_index {
                        continue;
                    }

                    let d1 = buffer[p2].time - buffer[p1].time;
                    let d2 = buffer[p3].time - buffer[p2].time;
                    let ratio = if d1 > d2 {
                        d1 as f32 / d2 as f32
                    } else {
                        d2 as f32 / d1 as f32
                    };
                    if ratio >= sensitivity.max_interval_ratio {
                        continue;
                    }

                    let min_height = buffer[p1]
                        .height
                        .min(buffer[p2].height)
                        .min(buffer[p3].height) as f32
                        * sensitivity.spurious_rejection_ratio;

                    // A comparable peak near the triple means we are inside
                    // a denser cluster (speech, clatter), not a knock.
                    let window_start = buffer[p1].time as i64 - span as i64 / 3;
                    let window_end = buffer[p3].time as i64 + span as i64 / 3;
                    let embedded = buffer.iter().enumerate().any(|(i, peak)| {
                        i != p1
                            && i != p2
                            && i != p3
                            && (peak.time as i64) > window_start
                            && (peak.time as i64) < window_end
                            && peak.height as f32 > min_height
                    });
                    if embedded {
                        continue;
                    }

                    if flags.contains(ScanFlags::DISP_EVENTS) {
                        log::info!(
                            "knock detected, time = {}, span = {}, ratio = {:.3}, heights = {} {} {}, widths = {} {} {}",
                            format_timestamp(buffer[p1].time),
                            d1 + d2,
                            ratio,
                            buffer[p1].height,
                            buffer[p2].height,
                            buffer[p3].height,
                            buffer[p1].width,
                            buffer[p2].width,
                            buffer[p3].width,
                        );
                    }
                    return true;
                }
            }
        }

        false
    }

    /// Watch recent peaks for sustained bell-band energy above each peak's
    /// own pre-transient baseline. Five confirmations across consecutive
    /// ticks (~500 ms) are required, rejecting brief bandpass flickers.
    fn confirm_bell(
        &self,
        peaks: &mut PeakBuffer,
        sample_index: u64,
        bell_level: f32,
        flags: ScanFlags,
    ) -> bool {
        for peak in peaks.as_mut_slice() {
            if peak.time + BELL_WATCH_SPAN > sample_index
                && bell_level > peak.filtered_level * 2.0 + 50.0
            {
                peak.filter_hits += 1;
                if peak.filter_hits == BELL_CONFIRM_HITS {
                    if flags.contains(ScanFlags::DISP_EVENTS) {
                        log::info!(
                            "ring detected, time = {}, delay = {:.3}, pre level = {:.2}, post level = {:.2}",
                            format_timestamp(peak.time),
                            (sample_index - peak.time) as f32 / SAMPLING_RATE as f32,
                            peak.filtered_level,
                            bell_level,
                        );
                    }
                    return true;
                }
            }
        }

        false
    }
}
