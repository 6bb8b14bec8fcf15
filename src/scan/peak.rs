//! Transient records and the bounded peak buffer
//!
//! Each contiguous positive excursion of the windowed level that clears the
//! adaptive threshold becomes a [`Peak`]. Peaks accumulate in time order in
//! a fixed 16-slot buffer; the classifier consumes them at 100 ms intervals.

use crate::constants::MAX_NUM_PEAKS;
use crate::flags::ScanFlags;

/// One detected transient.
///
/// `time` is the sample index of the excursion's maximum, not its onset;
/// the knock classifier measures spacing between maxima. `width` is the
/// virtual duration `area / height`, which ignores near-zero tails that
/// would inflate a literal sample count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Peak {
    pub time: u64,
    pub height: i32,
    pub area: i64,
    pub width: i64,
    /// Bell-band level sampled when the excursion opened. Later bell energy
    /// is judged against this baseline.
    pub filtered_level: f32,
    /// Analysis ticks on which the bell level exceeded the baseline.
    pub filter_hits: u32,
}

/// Fixed-capacity buffer of peaks in ascending time order.
///
/// New peaks are appended; expired peaks are dropped off the front. When
/// full, the smallest incumbent strictly below the newcomer is evicted, or
/// the newcomer itself is discarded if nothing is smaller. Either outcome
/// is logged under `DISP_EVENTS` so tuning sessions can see the pressure.
pub struct PeakBuffer {
    peaks: [Peak; MAX_NUM_PEAKS],
    len: usize,
}

impl PeakBuffer {
    pub fn new() -> Self {
        Self {
            peaks: [Peak::default(); MAX_NUM_PEAKS],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Peak] {
        &mut self.peaks[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Drop the peak at `index`, preserving order.
    pub fn remove(&mut self, index: usize) {
        self.peaks.copy_within(index + 1..self.len, index);
        self.len -= 1;
    }

    /// Append a peak, applying the smallest-evicted policy at capacity.
    pub fn push(&mut self, new_peak: Peak, flags: ScanFlags) {
        if self.len == MAX_NUM_PEAKS {
            let mut smallest_height = new_peak.height;
            let mut smallest_index = None;

            for (i, peak) in self.peaks.iter().enumerate() {
                if peak.height < smallest_height {
                    smallest_height = peak.height;
                    smallest_index = Some(i);
                }
            }

            let Some(index) = smallest_index else {
                if flags.contains(ScanFlags::DISP_EVENTS) {
                    log::info!(
                        "discarded newest peak (height = {}) because buffer was full",
                        new_peak.height
                    );
                }
                return;
            };

            self.remove(index);

            if flags.contains(ScanFlags::DISP_EVENTS) {
                log::info!(
                    "discarded smallest peak (height = {}) because buffer was full",
                    smallest_height
                );
            }
        }

        self.peaks[self.len] = new_peak;
        self.len += 1;
    }
}

impl Default for PeakBuffer {
    fn default() -> Self {
        Self::new()
    }
}
