//! Anti-aliasing FIR design for decimation using the windowing method

use super::windows::{generate_window, WindowKind};
use crate::error::{CoreError, Result};
use num_complex::Complex32;
use std::f32::consts::PI;

/// Cutoff for a decimation filter in cycles/sample (half the decimated Nyquist)
pub fn decimation_cutoff(decimation: usize) -> f32 {
    0.5 / decimation as f32
}

/// Design a lowpass FIR filter suitable for decimating by `decimation`
///
/// # Algorithm
/// 1. Ideal impulse response h[n] = 2fc * sinc(2fc * (n - (M-1)/2))
/// 2. Multiply by a window of length M
/// 3. Normalize to unity DC gain
///
/// # Arguments
/// * `taps` - Filter length M
/// * `decimation` - Decimation factor (cutoff is 0.5/decimation cycles/sample)
/// * `window_kind` - Window used to truncate the ideal response
pub fn design_decimation_lowpass(
    taps: usize,
    decimation: usize,
    window_kind: WindowKind,
) -> Result<Vec<f32>> {
    if taps == 0 {
        return Err(CoreError::invalid("filter length must be non-zero"));
    }
    if decimation == 0 {
        return Err(CoreError::invalid("decimation factor must be non-zero"));
    }

    let cutoff = decimation_cutoff(decimation);
    let window = generate_window(window_kind, taps);
    let center = (taps - 1) as f32 / 2.0;

    let mut h: Vec<f32> = window
        .iter()
        .enumerate()
        .map(|(n, &w)| {
            let n_shifted = n as f32 - center;
            let h_ideal = if n_shifted.abs() < 1e-6 {
                2.0 * cutoff
            } else {
                (2.0 * PI * cutoff * n_shifted).sin() / (PI * n_shifted)
            };
            h_ideal * w
        })
        .collect();

    let dc_gain: f32 = h.iter().sum();
    if dc_gain.abs() > f32::EPSILON {
        for coeff in h.iter_mut() {
            *coeff /= dc_gain;
        }
    }

    Ok(h)
}

/// Calculate frequency response at given frequencies
///
/// # Arguments
/// * `h` - Filter coefficients
/// * `frequencies` - Normalized frequencies in cycles/sample (0 to 0.5)
pub fn frequency_response(h: &[f32], frequencies: &[f32]) -> Vec<Complex32> {
    frequencies
        .iter()
        .map(|&f| {
            h.iter()
                .enumerate()
                .map(|(n, &h_n)| Complex32::from_polar(h_n, -2.0 * PI * f * n as f32))
                .sum()
        })
        .collect()
}

/// Calculate magnitude response in dB
pub fn magnitude_response_db(h: &[f32], frequencies: &[f32]) -> Vec<f32> {
    frequency_response(h, frequencies)
        .iter()
        .map(|c| 20.0 * c.norm().log10())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimation_lowpass_shape() {
        let h = design_decimation_lowpass(64, 2, WindowKind::Blackman).unwrap();
        assert_eq!(h.len(), 64);

        for i in 0..h.len() / 2 {
            assert!((h[i] - h[h.len() - 1 - i]).abs() < 1e-6);
        }

        let sum: f32 = h.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_decimation_lowpass_response() {
        let h = design_decimation_lowpass(64, 2, WindowKind::Blackman).unwrap();
        let response = magnitude_response_db(&h, &[0.0, 0.05, 0.4, 0.45]);

        // Passband flat, stopband well attenuated
        assert!(response[0].abs() < 0.1);
        assert!(response[1].abs() < 0.5);
        assert!(response[2] < -40.0, "stopband at 0.4: {}", response[2]);
        assert!(response[3] < -40.0, "stopband at 0.45: {}", response[3]);
    }

    #[test]
    fn test_invalid_design_arguments() {
        assert!(matches!(
            design_decimation_lowpass(0, 2, WindowKind::Hann),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            design_decimation_lowpass(32, 0, WindowKind::Hann),
            Err(CoreError::InvalidArgument(_))
        ));
    }
}
