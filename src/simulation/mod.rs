pub mod noise;
pub mod signal;

pub use noise::{add_white_noise, generate_white_noise};
pub use signal::{
    generate_bell_strike, generate_knock, generate_pulse_train, generate_silence, generate_tone,
    seconds_to_samples, PULSE_AMPLITUDE, PULSE_WIDTH_SECS,
};
