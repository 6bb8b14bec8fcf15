pub mod capture;
pub mod source;

pub use capture::AudioCapture;
pub use source::{DeviceSource, PcmFileSource, SampleSource, WavFileSource};
