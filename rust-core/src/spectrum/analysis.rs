//! High-level spectrum analyzer
//!
//! Combines the FFT engine with windowing and derives log-magnitude and
//! power spectra for the first half of the bins.

use super::fft::FftEngine;
use crate::display::raster::{rasterize, AxisBounds};
use crate::error::{try_zeroed, CoreError, Result};
use crate::filters::windows::WindowKind;
use num_complex::Complex32;
use tracing::{debug, info, warn, Level};

/// Log plot geometry of the firmware console view (columns x rows, bounds)
const LOG_PLOT_WIDTH: usize = 64;
const LOG_PLOT_HEIGHT: usize = 10;
const LOG_PLOT_MAGNITUDE: AxisBounds = AxisBounds { min: 0.0, max: 50.0 };
const LOG_PLOT_POWER: AxisBounds = AxisBounds { min: 0.0, max: 2.0 };

/// Result of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// 10*log10(|X[k]|² / N) for k = 0..N/2, -inf for empty bins
    pub log_magnitude: Vec<f32>,

    /// |X[k]|² / N for k = 0..N/2
    pub power: Vec<f32>,
}

impl Spectrum {
    /// Number of bins (N/2)
    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    /// FFT length the spectrum was computed from
    pub fn fft_len(&self) -> usize {
        self.power.len() * 2
    }

    /// Index of the bin with the largest power
    pub fn peak_bin(&self) -> Option<usize> {
        self.power
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(k, _)| k)
    }

    /// Centre frequency of bin `k` in Hz
    pub fn bin_frequency_hz(&self, bin: usize, sample_rate: u32) -> f32 {
        bin_frequency_hz(bin, sample_rate, self.fft_len())
    }

    /// Amplitude of a sine centred on `bin`, corrected for the window's coherent gain
    pub fn tone_amplitude(&self, bin: usize, window_kind: WindowKind) -> Option<f32> {
        let power = *self.power.get(bin)?;
        let length = self.fft_len();
        let gain = window_kind.coherent_gain(length);
        if gain <= 0.0 {
            return None;
        }
        // |X[k]| = A * N * gain / 2 and power = |X[k]|² / N
        Some(2.0 * (power * length as f32).sqrt() / (length as f32 * gain))
    }
}

/// Centre frequency of bin `k` of an `fft_len`-point FFT in Hz
pub fn bin_frequency_hz(bin: usize, sample_rate: u32, fft_len: usize) -> f32 {
    if fft_len == 0 {
        return 0.0;
    }
    bin as f32 * sample_rate as f32 / fft_len as f32
}

/// Spectrum analyzer owning the FFT engine state
///
/// Created empty; [`SpectrumAnalyzer::initialize`] builds the twiddle tables.
/// Callers sharing one analyzer across threads serialize access (e.g. a `Mutex`),
/// so tables are never rebuilt while `apply` runs.
#[derive(Default)]
pub struct SpectrumAnalyzer {
    engine: Option<FftEngine>,
}

impl SpectrumAnalyzer {
    /// Create an uninitialized analyzer
    pub fn new() -> Self {
        Self { engine: None }
    }

    /// Build FFT tables for sizes up to `max_size`
    ///
    /// Calling this again while initialized is a logged no-op.
    pub fn initialize(&mut self, max_size: usize) -> Result<()> {
        if let Some(engine) = &self.engine {
            warn!(
                current_max = engine.max_size(),
                requested_max = max_size,
                "FFT engine already initialized, keeping existing tables"
            );
            return Ok(());
        }

        self.engine = Some(FftEngine::new(max_size)?);
        info!(max_size, "FFT engine initialized");
        Ok(())
    }

    /// Release FFT tables; a no-op when not initialized
    pub fn deinitialize(&mut self) {
        if self.engine.take().is_some() {
            info!("FFT engine released");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// Largest FFT size available, if initialized
    pub fn max_size(&self) -> Option<usize> {
        self.engine.as_ref().map(FftEngine::max_size)
    }

    /// Window `samples`, transform them and derive log-magnitude and power spectra
    ///
    /// The FFT length is `samples.len()`, which must be a power of two no larger
    /// than the initialized maximum.
    pub fn apply(&mut self, samples: &[f32], window_kind: WindowKind) -> Result<Spectrum> {
        let engine = self.engine.as_mut().ok_or(CoreError::NotInitialized)?;

        let length = samples.len();
        if length == 0 {
            return Err(CoreError::invalid("no samples to analyze"));
        }
        if !engine.supports(length) {
            return Err(CoreError::invalid(format!(
                "FFT length {} must be a power of two in 2..={}",
                length,
                engine.max_size()
            )));
        }

        // Windowed samples as real parts, imaginary parts zero
        let mut signal: Vec<Complex32> = try_zeroed(length)?;
        for (n, (c, &s)) in signal.iter_mut().zip(samples.iter()).enumerate() {
            c.re = s * window_kind.coefficient(n, length);
        }

        engine.process(&mut signal)?;

        let bins = length / 2;
        let mut log_magnitude: Vec<f32> = try_zeroed(bins)?;
        let mut power: Vec<f32> = try_zeroed(bins)?;
        let scale = length as f32;

        for (k, c) in signal[..bins].iter().enumerate() {
            let p = (c.re * c.re + c.im * c.im) / scale;
            power[k] = p;
            log_magnitude[k] = 10.0 * p.log10();
        }

        let spectrum = Spectrum {
            log_magnitude,
            power,
        };

        if tracing::enabled!(Level::DEBUG) {
            log_spectrum_plots(&spectrum);
        }

        Ok(spectrum)
    }
}

fn log_spectrum_plots(spectrum: &Spectrum) {
    let plots = [
        ("log scale", &spectrum.log_magnitude, LOG_PLOT_MAGNITUDE),
        ("absolute scale", &spectrum.power, LOG_PLOT_POWER),
    ];

    for (label, series, bounds) in plots {
        match rasterize(series, LOG_PLOT_WIDTH, LOG_PLOT_HEIGHT, bounds) {
            Ok(canvas) => debug!("Signal in {}:\n{}", label, canvas.to_ascii('|')),
            Err(e) => debug!("Skipping {} plot: {}", label, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn bin_sine(bin: usize, length: usize) -> Vec<f32> {
        (0..length)
            .map(|n| (2.0 * PI * bin as f32 * n as f32 / length as f32).sin())
            .collect()
    }

    #[test]
    fn test_apply_requires_initialize() {
        let mut analyzer = SpectrumAnalyzer::new();
        let samples = vec![0.0; 64];
        assert_eq!(
            analyzer.apply(&samples, WindowKind::Hann),
            Err(CoreError::NotInitialized)
        );
    }

    #[test]
    fn test_lifecycle() {
        let mut analyzer = SpectrumAnalyzer::new();

        // Deinit before init is a silent no-op
        analyzer.deinitialize();
        assert!(!analyzer.is_initialized());

        analyzer.initialize(1024).unwrap();
        analyzer.initialize(2048).unwrap();
        assert_eq!(analyzer.max_size(), Some(1024));

        analyzer.deinitialize();
        assert!(!analyzer.is_initialized());
        assert_eq!(
            analyzer.apply(&[0.0; 8], WindowKind::Hann),
            Err(CoreError::NotInitialized)
        );
    }

    #[test]
    fn test_single_dominant_peak() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.initialize(1024).unwrap();

        let length = 1024;
        let bin = 100;
        let samples = bin_sine(bin, length);

        for kind in WindowKind::ALL {
            let spectrum = analyzer.apply(&samples, kind).unwrap();
            assert_eq!(spectrum.len(), length / 2);
            assert_eq!(spectrum.peak_bin(), Some(bin), "{}", kind);

            let peak_db = spectrum.log_magnitude[bin];
            let mainlobe = kind.mainlobe_half_width_bins();
            for (k, &db) in spectrum.log_magnitude.iter().enumerate() {
                if k.abs_diff(bin) > mainlobe {
                    assert!(db < peak_db - 10.0, "{}: bin {} at {} dB", kind, k, db);
                }
            }
        }
    }

    #[test]
    fn test_power_scaling() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.initialize(1024).unwrap();

        // Unit sine with Hann window: |X[k]| = N/4, power = N/16
        let spectrum = analyzer.apply(&bin_sine(64, 1024), WindowKind::Hann).unwrap();
        let power = spectrum.power[64];
        assert!((power - 64.0).abs() < 1.0, "power {}", power);
        assert!((spectrum.log_magnitude[64] - 10.0 * 64.0f32.log10()).abs() < 0.1);
    }

    #[test]
    fn test_tone_amplitude_corrects_window_gain() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.initialize(1024).unwrap();

        let samples: Vec<f32> = bin_sine(64, 1024).iter().map(|&x| 0.5 * x).collect();
        for kind in [WindowKind::Hann, WindowKind::Blackman, WindowKind::FlatTop] {
            let spectrum = analyzer.apply(&samples, kind).unwrap();
            let amplitude = spectrum.tone_amplitude(64, kind).unwrap();
            assert!((amplitude - 0.5).abs() < 0.01, "{}: {}", kind, amplitude);
        }

        let spectrum = analyzer.apply(&samples, WindowKind::Hann).unwrap();
        assert_eq!(spectrum.tone_amplitude(512, WindowKind::Hann), None);
    }

    #[test]
    fn test_zero_energy_is_negative_infinity() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.initialize(64).unwrap();

        let spectrum = analyzer.apply(&[0.0; 64], WindowKind::Blackman).unwrap();
        assert!(spectrum
            .log_magnitude
            .iter()
            .all(|&db| db == f32::NEG_INFINITY));
        assert!(spectrum.power.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.initialize(256).unwrap();

        assert!(matches!(
            analyzer.apply(&[], WindowKind::Hann),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            analyzer.apply(&[0.0; 100], WindowKind::Hann),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            analyzer.apply(&[0.0; 512], WindowKind::Hann),
            Err(CoreError::InvalidArgument(_))
        ));
        // A failed call leaves the engine usable
        assert!(analyzer.is_initialized());
        assert!(analyzer.apply(&[0.0; 256], WindowKind::Hann).is_ok());
    }

    #[test]
    fn test_bin_frequency() {
        assert_eq!(bin_frequency_hz(256, 200, 1024), 50.0);
        assert_eq!(bin_frequency_hz(3, 200, 0), 0.0);
    }
}
