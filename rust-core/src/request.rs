//! Already-parsed request payloads from the network layer
//!
//! Field names follow the device's JSON wire format, e.g.
//! `{"sample_frequency": 8000, "waves": [{"amplitude": 1, "frequency": 440, "phase": 0}]}`.

use crate::error::{CoreError, Result};
use crate::filters::windows::WindowKind;
use crate::synth::wave::WaveDescriptor;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One tone as sent by a client, frequency in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
    #[serde(default)]
    pub offset: f32,
}

/// Replace the synthesized waveform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveRequest {
    pub sample_frequency: u32,
    pub waves: Vec<WaveSpec>,
}

impl WaveRequest {
    /// Normalize the requested tones against the sample rate
    ///
    /// Tones beyond `max_waves` are discarded, as are tones whose normalized
    /// frequency falls outside (0, 1]; each discard is logged and the rest of
    /// the request proceeds. Fails only on a zero sample rate.
    pub fn descriptors(&self, max_waves: usize) -> Result<Vec<WaveDescriptor>> {
        if self.sample_frequency == 0 {
            return Err(CoreError::invalid("sample_frequency must be non-zero"));
        }

        if self.waves.len() > max_waves {
            warn!(
                "Request has {} waves, keeping the first {}",
                self.waves.len(),
                max_waves
            );
        }

        let descriptors = self
            .waves
            .iter()
            .take(max_waves)
            .enumerate()
            .filter_map(|(index, wave)| {
                match WaveDescriptor::from_hz(
                    wave.amplitude,
                    wave.frequency,
                    wave.phase,
                    wave.offset,
                    self.sample_frequency,
                ) {
                    Ok(descriptor) => Some(descriptor),
                    Err(e) => {
                        warn!(
                            "Dropping wave {} ({} Hz at {} Hz sampling): {}",
                            index, wave.frequency, self.sample_frequency, e
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(descriptors)
    }
}

/// Run an analysis with the given window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub window: WindowKind,
}

impl AnalysisRequest {
    /// Build a request from a window wire name such as `"HANN_F32"`
    pub fn from_window_name(name: &str) -> Result<Self> {
        match name.parse::<WindowKind>() {
            Ok(window) => Ok(Self { window }),
            Err(e) => {
                warn!("Unknown window type '{}'", name);
                Err(e)
            }
        }
    }
}

/// Stream the sample buffer to the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRequest {
    pub sample_frequency: u32,
    #[serde(default)]
    pub prevent_overflow: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_request_json() {
        let request: WaveRequest = serde_json::from_str(
            r#"{
                "sample_frequency": 8000,
                "waves": [
                    { "amplitude": 1.0, "frequency": 1000, "phase": 0 },
                    { "amplitude": 0.5, "frequency": 2000, "phase": 1.57, "offset": 1.0 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(request.sample_frequency, 8000);
        assert_eq!(request.waves.len(), 2);
        assert_eq!(request.waves[0].offset, 0.0);

        let descriptors = request.descriptors(10).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert!((descriptors[0].frequency() - 0.125).abs() < 1e-6);
        assert!((descriptors[1].frequency() - 0.25).abs() < 1e-6);
        assert_eq!(descriptors[1].offset(), 1.0);
    }

    #[test]
    fn test_out_of_range_waves_dropped() {
        let request = WaveRequest {
            sample_frequency: 1000,
            waves: vec![
                WaveSpec { amplitude: 1.0, frequency: 100.0, phase: 0.0, offset: 0.0 },
                WaveSpec { amplitude: 1.0, frequency: 1500.0, phase: 0.0, offset: 0.0 },
                WaveSpec { amplitude: 1.0, frequency: 0.0, phase: 0.0, offset: 0.0 },
                WaveSpec { amplitude: 1.0, frequency: 1000.0, phase: 0.0, offset: 0.0 },
            ],
        };

        let descriptors = request.descriptors(10).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].frequency(), 1.0);
    }

    #[test]
    fn test_wave_list_truncated() {
        let request = WaveRequest {
            sample_frequency: 1000,
            waves: vec![WaveSpec { amplitude: 1.0, frequency: 10.0, phase: 0.0, offset: 0.0 }; 12],
        };
        assert_eq!(request.descriptors(10).unwrap().len(), 10);

        let silent = WaveRequest {
            sample_frequency: 0,
            waves: Vec::new(),
        };
        assert!(matches!(silent.descriptors(10), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_analysis_request() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{ "window": "BLACKMAN_HARRIS_F32" }"#).unwrap();
        assert_eq!(request.window, WindowKind::BlackmanHarris);

        assert!(serde_json::from_str::<AnalysisRequest>(r#"{ "window": "HAMMING_F32" }"#).is_err());
        assert_eq!(
            AnalysisRequest::from_window_name("FLAT_TOP_F32").unwrap().window,
            WindowKind::FlatTop
        );
        assert!(matches!(
            AnalysisRequest::from_window_name("RECT"),
            Err(CoreError::UnknownWindowType(_))
        ));
    }

    #[test]
    fn test_output_request_defaults() {
        let request: OutputRequest = serde_json::from_str(r#"{ "sample_frequency": 200 }"#).unwrap();
        assert_eq!(request.sample_frequency, 200);
        assert!(!request.prevent_overflow);
    }
}
