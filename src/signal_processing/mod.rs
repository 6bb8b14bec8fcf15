pub mod biquad;
pub mod decorrelator;
pub mod level;
pub mod window;

pub use biquad::{bandpass, Biquad, BiquadCoefficients};
pub use decorrelator::Decorrelator;
pub use level::LevelTracker;
pub use window::SlidingWindow;
