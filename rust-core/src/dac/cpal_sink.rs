//! Host audio output standing in for a physical converter
//!
//! Codes drained from a [`CodeConsumer`] are held for the duration of one
//! converter period and played on every channel of the default output device.

use super::ring::CodeConsumer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("No output device available")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Converter rate must be non-zero")]
    ZeroRate,

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),
}

#[derive(Debug, Clone)]
pub struct SinkDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Map a converter code onto the audio range [-1, 1)
#[inline]
fn code_to_level(code: u8) -> f32 {
    code as f32 / 127.5 - 1.0
}

/// Sample-and-hold resampler from the converter rate to the device rate
struct HoldState {
    consumer: CodeConsumer,
    step: f64,
    phase: f64,
    level: f32,
}

impl HoldState {
    fn new(consumer: CodeConsumer, step: f64) -> Self {
        Self {
            consumer,
            step,
            // First frame picks up a code immediately
            phase: 1.0 - step.min(1.0),
            level: 0.0,
        }
    }

    #[inline]
    fn next_level(&mut self) -> f32 {
        self.phase += self.step;
        while self.phase >= 1.0 {
            self.phase -= 1.0;
            if let Some(code) = self.consumer.pop() {
                self.level = code_to_level(code);
            }
        }
        self.level
    }
}

/// Audio output stream fed by converter codes
pub struct CpalDacSink {
    stream: Stream,
    device_info: SinkDeviceInfo,
}

impl CpalDacSink {
    /// Open the default output device
    ///
    /// # Arguments
    /// * `consumer` - Reading end of the converter channel
    /// * `dac_rate_hz` - Rate at which codes are produced
    pub fn from_default_device(consumer: CodeConsumer, dac_rate_hz: u32) -> Result<Self, SinkError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SinkError::NoDevice)?;

        Self::from_device(device, consumer, dac_rate_hz)
    }

    pub fn from_device(
        device: Device,
        consumer: CodeConsumer,
        dac_rate_hz: u32,
    ) -> Result<Self, SinkError> {
        if dac_rate_hz == 0 {
            return Err(SinkError::ZeroRate);
        }

        let name = device
            .name()
            .map_err(|e| SinkError::DeviceName(e.to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| SinkError::DefaultConfig(e.to_string()))?;

        let device_info = SinkDeviceInfo {
            name,
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };
        let channels = usize::from(device_info.channels.max(1));
        let stream_config: StreamConfig = config.into();

        let mut hold = HoldState::new(
            consumer,
            f64::from(dac_rate_hz) / f64::from(device_info.sample_rate.max(1)),
        );

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let level = hold.next_level();
                        frame.fill(level);
                    }
                },
                move |err| {
                    error!("Converter sink stream error: {}", err);
                },
                None,
            )
            .map_err(|e| SinkError::BuildStream(e.to_string()))?;

        info!(
            "Converter sink on '{}' ({} Hz, {} channels) for {} Hz codes",
            device_info.name, device_info.sample_rate, device_info.channels, dac_rate_hz
        );

        Ok(Self {
            stream,
            device_info,
        })
    }

    pub fn start(&self) -> Result<(), SinkError> {
        self.stream
            .play()
            .map_err(|e| SinkError::PlayStream(e.to_string()))
    }

    pub fn pause(&self) -> Result<(), SinkError> {
        self.stream
            .pause()
            .map_err(|e| SinkError::PlayStream(e.to_string()))
    }

    pub fn device_info(&self) -> &SinkDeviceInfo {
        &self.device_info
    }
}
