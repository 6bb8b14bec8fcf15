//! Direct-form-I biquad bandpass for bell fundamental extraction
//!
//! The coefficients follow the constant-skirt-gain bandpass design
//! (unity gain at resonance before the premultiplied gain). At Q 100 the
//! passband is a few hertz wide, so broadband sound barely registers while
//! a bell's fundamental rings the filter up to the full gain.

use crate::error::{Result, ScanError};

/// Bandpass coefficient set, a-side not yet gain-scaled.
#[derive(Debug, Clone, Copy)]
pub struct BiquadCoefficients {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub b1: f64,
    pub b2: f64,
}

/// Design a narrow bandpass centered on `frequency_hz`.
pub fn bandpass(frequency_hz: f32, q: f32, sample_rate: u32) -> Result<BiquadCoefficients> {
    let nyquist = sample_rate as f32 / 2.0;
    if !(frequency_hz > 0.0 && frequency_hz < nyquist) {
        return Err(ScanError::FilterDesign(format!(
            "center frequency {} Hz outside (0, {}) Hz",
            frequency_hz, nyquist
        )));
    }
    if q <= 0.0 {
        return Err(ScanError::FilterDesign(format!(
            "quality factor {} must be positive",
            q
        )));
    }

    let k = (std::f64::consts::PI * frequency_hz as f64 / sample_rate as f64).tan();
    let k_over_q = k / q as f64;
    let norm = 1.0 / (1.0 + k_over_q + k * k);

    Ok(BiquadCoefficients {
        a0: k_over_q * norm,
        a1: 0.0,
        a2: -k_over_q * norm,
        b1: 2.0 * (k * k - 1.0) * norm,
        b2: (1.0 - k_over_q + k * k) * norm,
    })
}

/// Direct-form-I biquad with the gain folded into the a-coefficients,
/// saving a multiply per sample.
pub struct Biquad {
    a0: f32,
    a1: f32,
    a2: f32,
    b1: f32,
    b2: f32,
    in_d1: f32,
    in_d2: f32,
    out_d1: f32,
    out_d2: f32,
}

impl Biquad {
    pub fn new(coefficients: &BiquadCoefficients, gain: f32) -> Self {
        Self {
            a0: (coefficients.a0 * gain as f64) as f32,
            a1: (coefficients.a1 * gain as f64) as f32,
            a2: (coefficients.a2 * gain as f64) as f32,
            b1: coefficients.b1 as f32,
            b2: coefficients.b2 as f32,
            in_d1: 0.0,
            in_d2: 0.0,
            out_d1: 0.0,
            out_d2: 0.0,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let sum = input * self.a0 + self.in_d1 * self.a1 + self.in_d2 * self.a2
            - self.b1 * self.out_d1
            - self.b2 * self.out_d2;
        self.out_d2 = self.out_d1;
        self.out_d1 = sum;
        self.in_d2 = self.in_d1;
        self.in_d1 = input;
        sum
    }

    pub fn reset(&mut self) {
        self.in_d1 = 0.0;
        self.in_d2 = 0.0;
        self.out_d1 = 0.0;
        self.out_d2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_stock_bell_coefficients() {
        // The 770 Hz / Q 100 design the detector shipped with.
        let c = bandpass(770.0, 100.0, 16000).unwrap();

        assert!((c.a0 - 0.0014867434962988915).abs() < 1e-12);
        assert_eq!(c.a1, 0.0);
        assert!((c.a2 + 0.0014867434962988915).abs() < 1e-12);
        assert!((c.b1 + 1.9064233259820802).abs() < 1e-12);
        assert!((c.b2 - 0.9970265130074023).abs() < 1e-12);
    }

    #[test]
    fn test_alternate_bell_coefficients() {
        // 785 Hz wireless doorbell variant.
        let c = bandpass(785.0, 100.0, 16000).unwrap();

        assert!((c.a0 - 0.001514749455122275).abs() < 1e-12);
        assert!((c.b1 + 1.9028338435963745).abs() < 1e-12);
        assert!((c.b2 - 0.9969705010897554).abs() < 1e-12);
    }

    #[test]
    fn test_design_rejects_bad_parameters() {
        assert!(bandpass(0.0, 100.0, 16000).is_err());
        assert!(bandpass(8000.0, 100.0, 16000).is_err());
        assert!(bandpass(770.0, 0.0, 16000).is_err());
        assert!(bandpass(770.0, -1.0, 16000).is_err());
    }

    fn peak_output(filter: &mut Biquad, frequency_hz: f32, amplitude: f32) -> f32 {
        let mut peak = 0.0f32;
        for i in 0..16000 {
            let input = amplitude * (2.0 * PI * frequency_hz * i as f32 / 16000.0).sin();
            let out = filter.process(input);
            // Skip the ring-up, measure the settled response.
            if i >= 14400 {
                peak = peak.max(out.abs());
            }
        }
        peak
    }

    #[test]
    fn test_resonance_gain() {
        let coefficients = bandpass(770.0, 100.0, 16000).unwrap();
        let mut filter = Biquad::new(&coefficients, 4.0);

        let on_resonance = peak_output(&mut filter, 770.0, 100.0);
        assert!(
            (on_resonance - 400.0).abs() < 40.0,
            "Expected ~4x gain at resonance, got peak {}",
            on_resonance
        );
    }

    #[test]
    fn test_off_resonance_rejection() {
        let coefficients = bandpass(770.0, 100.0, 16000).unwrap();
        let mut filter = Biquad::new(&coefficients, 4.0);

        let off_resonance = peak_output(&mut filter, 400.0, 100.0);
        assert!(
            off_resonance < 10.0,
            "400 Hz should be far outside the Q=100 passband, got peak {}",
            off_resonance
        );
    }

    #[test]
    fn test_reset_clears_ringing() {
        let coefficients = bandpass(770.0, 100.0, 16000).unwrap();
        let mut filter = Biquad::new(&coefficients, 4.0);

        filter.process(10000.0);
        filter.process(10000.0);
        filter.reset();

        assert_eq!(filter.process(0.0), 0.0);
    }
}
