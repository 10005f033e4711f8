//! Window functions for spectral analysis and FIR decimation
//!
//! The six cosine-sum windows supported by the device, with the coefficient
//! sets of the firmware's DSP library.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowKind {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(L-1))
    /// Sidelobe attenuation: ~31 dB
    #[serde(rename = "HANN_F32")]
    Hann,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(L-1)) + 0.08*cos(4πn/(L-1))
    /// Sidelobe attenuation: ~58 dB
    #[serde(rename = "BLACKMAN_F32")]
    Blackman,

    /// 4-term Blackman-Harris, sidelobe attenuation ~92 dB
    #[serde(rename = "BLACKMAN_HARRIS_F32")]
    BlackmanHarris,

    /// 4-term Blackman-Nuttall, sidelobe attenuation ~98 dB
    #[serde(rename = "BLACKMAN_NUTTALL_F32")]
    BlackmanNuttall,

    /// 4-term Nuttall (continuous first derivative), sidelobe attenuation ~93 dB
    #[serde(rename = "NUTTALL_F32")]
    Nuttall,

    /// 5-term flat-top, amplitude-accurate, very wide mainlobe
    #[serde(rename = "FLAT_TOP_F32")]
    FlatTop,
}

impl WindowKind {
    /// All windows in selector order
    pub const ALL: [WindowKind; 6] = [
        WindowKind::Hann,
        WindowKind::Blackman,
        WindowKind::BlackmanHarris,
        WindowKind::BlackmanNuttall,
        WindowKind::Nuttall,
        WindowKind::FlatTop,
    ];

    /// Wire name used by the request layer
    pub fn name(&self) -> &'static str {
        match self {
            WindowKind::Hann => "HANN_F32",
            WindowKind::Blackman => "BLACKMAN_F32",
            WindowKind::BlackmanHarris => "BLACKMAN_HARRIS_F32",
            WindowKind::BlackmanNuttall => "BLACKMAN_NUTTALL_F32",
            WindowKind::Nuttall => "NUTTALL_F32",
            WindowKind::FlatTop => "FLAT_TOP_F32",
        }
    }

    /// Numeric selector (position in [`WindowKind::ALL`])
    pub fn selector(&self) -> u8 {
        match self {
            WindowKind::Hann => 0,
            WindowKind::Blackman => 1,
            WindowKind::BlackmanHarris => 2,
            WindowKind::BlackmanNuttall => 3,
            WindowKind::Nuttall => 4,
            WindowKind::FlatTop => 5,
        }
    }

    /// Cosine-sum coefficients a0..a4, w[n] = Σ (-1)^k a_k cos(2πkn/(L-1))
    fn cosine_terms(&self) -> &'static [f32] {
        match self {
            WindowKind::Hann => &[0.5, 0.5],
            WindowKind::Blackman => &[0.42, 0.5, 0.08],
            WindowKind::BlackmanHarris => &[0.35875, 0.48829, 0.14128, 0.01168],
            WindowKind::BlackmanNuttall => &[0.363_581_9, 0.489_177_5, 0.136_599_5, 0.010_641_1],
            WindowKind::Nuttall => &[0.355768, 0.487396, 0.144232, 0.012604],
            WindowKind::FlatTop => &[1.0, 1.93, 1.29, 0.388, 0.028],
        }
    }

    /// Half-width of the mainlobe in FFT bins (equals the number of cosine terms)
    pub fn mainlobe_half_width_bins(&self) -> usize {
        self.cosine_terms().len()
    }

    /// Coefficient w[n] of a window of `length` samples
    ///
    /// Windows of zero or one sample have a single unit coefficient.
    #[inline]
    pub fn coefficient(&self, n: usize, length: usize) -> f32 {
        if length <= 1 {
            return 1.0;
        }

        let angle = 2.0 * PI * n as f32 / (length - 1) as f32;
        self.cosine_terms()
            .iter()
            .enumerate()
            .map(|(k, &a)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * a * (k as f32 * angle).cos()
            })
            .sum()
    }

    /// Mean coefficient value for a window of `length` samples
    ///
    /// Divide a windowed amplitude by this to recover the unwindowed amplitude.
    pub fn coherent_gain(&self, length: usize) -> f32 {
        if length == 0 {
            return 0.0;
        }
        let sum: f32 = (0..length).map(|n| self.coefficient(n, length)).sum();
        sum / length as f32
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for WindowKind {
    type Error = CoreError;

    fn try_from(selector: u8) -> Result<Self> {
        WindowKind::ALL
            .get(selector as usize)
            .copied()
            .ok_or_else(|| CoreError::UnknownWindowType(format!("selector {}", selector)))
    }
}

impl FromStr for WindowKind {
    type Err = CoreError;

    fn from_str(name: &str) -> Result<Self> {
        WindowKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| CoreError::UnknownWindowType(name.to_string()))
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_kind` - Type of window function
/// * `length` - Number of samples (L)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..L-1
pub fn generate_window(window_kind: WindowKind, length: usize) -> Vec<f32> {
    (0..length)
        .map(|n| window_kind.coefficient(n, length))
        .collect()
}

/// Generate window coefficients from a raw numeric selector
///
/// Fails with `UnknownWindowType` when the selector is outside the six defined windows.
pub fn generate_window_by_selector(selector: u8, length: usize) -> Result<Vec<f32>> {
    let kind = WindowKind::try_from(selector)?;
    Ok(generate_window(kind, length))
}
