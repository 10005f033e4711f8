//! Sampled sine wave descriptors and additive synthesis

use crate::error::{CoreError, Result};
use std::f32::consts::PI;

/// One sine component: amplitude * sin(2π * frequency * i + phase) + offset
///
/// Frequency is normalized to cycles/sample and is validated on construction,
/// so a descriptor above the supported range can never reach the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDescriptor {
    amplitude: f32,
    frequency: f32,
    phase: f32,
    offset: f32,
}

impl WaveDescriptor {
    /// Create a descriptor from a normalized frequency (0 < frequency <= 1)
    pub fn new(amplitude: f32, frequency: f32, phase: f32, offset: f32) -> Result<Self> {
        if !(frequency > 0.0 && frequency <= 1.0) {
            return Err(CoreError::invalid(format!(
                "normalized frequency {} outside (0, 1]",
                frequency
            )));
        }
        if !amplitude.is_finite() || !phase.is_finite() || !offset.is_finite() {
            return Err(CoreError::invalid("wave parameters must be finite"));
        }

        Ok(Self {
            amplitude,
            frequency,
            phase,
            offset,
        })
    }

    /// Create a descriptor from a frequency in Hz, normalized by the sample rate
    pub fn from_hz(
        amplitude: f32,
        frequency_hz: f32,
        phase: f32,
        offset: f32,
        sample_rate: u32,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::invalid("sample rate must be non-zero"));
        }
        Self::new(amplitude, frequency_hz / sample_rate as f32, phase, offset)
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Normalized frequency in cycles/sample
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Value of sample `i`
    #[inline]
    pub fn sample(&self, i: usize) -> f32 {
        // Reduce the cycle count first to keep precision for long buffers
        let cycles = (self.frequency as f64 * i as f64).fract() as f32;
        self.amplitude * (2.0 * PI * cycles + self.phase).sin() + self.offset
    }
}

/// Accumulate every descriptor into `destination`
///
/// The destination is not cleared; callers zero it first when they want a
/// fresh waveform rather than a sum onto existing content.
pub fn synthesize(descriptors: &[WaveDescriptor], destination: &mut [f32]) -> Result<()> {
    if destination.is_empty() {
        return Err(CoreError::invalid("destination buffer is empty"));
    }

    for wave in descriptors {
        for (i, sample) in destination.iter_mut().enumerate() {
            *sample += wave.sample(i);
        }
    }

    Ok(())
}
