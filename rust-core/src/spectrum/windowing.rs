//! Windowing applied to a sample block before the FFT
//!
//! Reduces spectral leakage from the block edges

use crate::error::{try_zeroed, Result};
use crate::filters::windows::WindowKind;

/// Apply window to signal
///
/// # Returns
/// Windowed copy of `signal`, or `AllocationFailure` if the copy cannot be made
pub fn apply_window(signal: &[f32], window_kind: WindowKind) -> Result<Vec<f32>> {
    let mut windowed: Vec<f32> = try_zeroed(signal.len())?;
    windowed.copy_from_slice(signal);
    apply_window_inplace(&mut windowed, window_kind);
    Ok(windowed)
}

/// Apply window in-place, computing coefficients on the fly
pub fn apply_window_inplace(signal: &mut [f32], window_kind: WindowKind) {
    let length = signal.len();
    for (n, s) in signal.iter_mut().enumerate() {
        *s *= window_kind.coefficient(n, length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::windows::generate_window;

    #[test]
    fn test_apply_window() {
        let signal = vec![1.0; 101];
        let windowed = apply_window(&signal, WindowKind::Hann).unwrap();

        assert_eq!(windowed.len(), 101);
        assert!((windowed[50] - 1.0).abs() < 1e-5);
        assert!(windowed[0].abs() < 1e-6);
        assert!(windowed[100].abs() < 1e-6);
    }

    #[test]
    fn test_inplace_matches_copy() {
        let signal: Vec<f32> = (0..64).map(|n| n as f32 * 0.1).collect();
        let copy = apply_window(&signal, WindowKind::Nuttall).unwrap();

        let mut inplace = signal.clone();
        apply_window_inplace(&mut inplace, WindowKind::Nuttall);

        assert_eq!(copy, inplace);

        let coefficients = generate_window(WindowKind::Nuttall, 64);
        for ((&s, &w), &y) in signal.iter().zip(coefficients.iter()).zip(copy.iter()) {
            assert_eq!(s * w, y);
        }
    }

    #[test]
    fn test_empty_signal() {
        assert!(apply_window(&[], WindowKind::FlatTop).unwrap().is_empty());
    }
}
