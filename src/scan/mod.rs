pub mod classifier;
pub mod peak;
pub mod scanner;
pub mod threshold;

pub use peak::{Peak, PeakBuffer};
pub use scanner::AudioScanner;
pub use threshold::AdaptiveThreshold;

use crate::constants::SAMPLING_RATE;

/// Format a sample index as 24-hour wall-clock time, millisecond precision.
pub fn format_timestamp(time_in_samples: u64) -> String {
    let rate = u64::from(SAMPLING_RATE);
    let hours = time_in_samples / (rate * 3600);
    let minutes = time_in_samples / (rate * 60) % 60;
    let seconds = (time_in_samples % (rate * 60)) as f64 / f64::from(SAMPLING_RATE);
    format!("{:02}:{:02}:{:06.3}", hours, minutes, seconds)
}
