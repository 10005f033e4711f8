//! Wavescope - Signal Synthesis, Spectrum Analysis and DAC Output Core
//!
//! Additive sine synthesis into a shared sample buffer, windowed FFT analysis,
//! min/max column-binned rendering onto a small monochrome display and
//! timer-driven streaming to an 8-bit converter.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod error;
pub mod config;
pub mod filters;
pub mod synth;
pub mod spectrum;
pub mod display;
pub mod dac;
pub mod request;
pub mod workbench;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{CoreError, Result};
pub use config::{DeviceConfig, DisplayConfig, DacConfig, DecimationConfig, RunMode};
pub use filters::{WindowKind, generate_window, FirDecimator};
pub use synth::{WaveDescriptor, SampleBuffer, synthesize};
pub use spectrum::{Spectrum, SpectrumAnalyzer};
pub use display::{AxisBounds, RasterCanvas, FrameBuffer, rasterize};
pub use dac::{DacScheduler, DacChannel, RepeatingTimer};
pub use request::{WaveRequest, WaveSpec, AnalysisRequest, OutputRequest};
pub use workbench::Workbench;
