//! Device configuration
//!
//! Plain structs with defaults matching the reference hardware (ESP32 with a
//! 128x64 SSD1306 panel and an 8-bit DAC on a 3.3 V rail).

use crate::display::raster::AxisBounds;
use crate::error::{CoreError, Result};
use crate::filters::windows::WindowKind;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Length of the shared sample buffer
    pub sample_count: usize,

    /// Maximum number of wave descriptors accepted per request
    pub max_waves: usize,

    /// Largest FFT the analyzer prepares tables for (power of two)
    pub max_fft_size: usize,

    pub display: DisplayConfig,

    /// Vertical range for log-magnitude plots (dB)
    pub spectrum_bounds: AxisBounds,

    /// Vertical range for time-domain plots
    pub waveform_bounds: AxisBounds,

    pub dac: DacConfig,

    pub decimation: DecimationConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sample_count: 1024,
            max_waves: 10,
            max_fft_size: 4096,
            display: DisplayConfig::default(),
            spectrum_bounds: AxisBounds { min: 0.0, max: 50.0 },
            waveform_bounds: AxisBounds { min: -4.0, max: 4.0 },
            dac: DacConfig::default(),
            decimation: DecimationConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            return Err(CoreError::invalid("sample_count must be non-zero"));
        }
        if self.max_fft_size < 2 || !self.max_fft_size.is_power_of_two() {
            return Err(CoreError::invalid("max_fft_size must be a power of two >= 2"));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(CoreError::invalid("display dimensions must be non-zero"));
        }
        self.spectrum_bounds.validate()?;
        self.waveform_bounds.validate()?;
        self.dac.validate()?;
        if self.decimation.factor == 0 || self.decimation.taps == 0 {
            return Err(CoreError::invalid("decimation factor and taps must be non-zero"));
        }
        Ok(())
    }
}

/// Display geometry and polarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,

    /// Draw marked pixels as off (panels where 0 = lit)
    pub invert: bool,

    /// Overlay axis labels on spectrum plots
    pub labels: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            invert: true,
            labels: true,
        }
    }
}

/// When a DAC session ends on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Cycle through the buffer until stopped
    Continuous,

    /// Stop after one pass over the buffer
    SinglePass,

    /// Stop after this many ticks
    Samples(u64),
}

/// Converter input range and session behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DacConfig {
    /// Sample value mapped to code 0
    pub range_min: f32,

    /// Sample value mapped to code 255
    pub range_max: f32,

    pub run_mode: RunMode,
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            range_min: 0.0,
            range_max: 3.3,
            run_mode: RunMode::Continuous,
        }
    }
}

impl DacConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.range_max > self.range_min)
            || !self.range_min.is_finite()
            || !self.range_max.is_finite()
        {
            return Err(CoreError::invalid("DAC range must satisfy range_min < range_max"));
        }
        Ok(())
    }
}

/// Anti-aliasing filter used before decimated analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationConfig {
    pub factor: usize,
    pub taps: usize,
    pub window: WindowKind,
}

impl Default for DecimationConfig {
    fn default() -> Self {
        Self {
            factor: 2,
            taps: 64,
            window: WindowKind::Blackman,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        DeviceConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DeviceConfig = serde_json::from_str(
            r#"{ "sample_count": 512, "dac": { "run_mode": { "samples": 200 } } }"#,
        )
        .unwrap();

        assert_eq!(config.sample_count, 512);
        assert_eq!(config.dac.run_mode, RunMode::Samples(200));
        assert_eq!(config.dac.range_max, 3.3);
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_run_mode_names() {
        let mode: RunMode = serde_json::from_str(r#""single_pass""#).unwrap();
        assert_eq!(mode, RunMode::SinglePass);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = DeviceConfig::default();
        config.max_fft_size = 1000;
        assert!(config.validate().is_err());

        let mut config = DeviceConfig::default();
        config.dac.range_min = 5.0;
        assert!(config.validate().is_err());

        let mut config = DeviceConfig::default();
        config.spectrum_bounds = AxisBounds { min: 50.0, max: 0.0 };
        assert!(config.validate().is_err());
    }
}
