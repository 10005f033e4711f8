//! Request-facing controller tying synthesis, analysis, display and output together
//!
//! Every operation runs to completion in the caller's context. Only the DAC
//! tick runs elsewhere, and it reads an immutable snapshot of the sample
//! buffer, so rewriting the buffer follows a strict order: stop the session,
//! rewrite, then start a new session from a fresh snapshot.

use crate::config::DeviceConfig;
use crate::dac::{DacChannel, DacScheduler, DacStatus, RepeatingTimer};
use crate::display::raster::RasterCanvas;
use crate::display::render::{render_spectrum, render_waveform};
use crate::error::{CoreError, Result};
use crate::filters::design::design_decimation_lowpass;
use crate::filters::fir::FirDecimator;
use crate::filters::windows::WindowKind;
use crate::request::{AnalysisRequest, OutputRequest, WaveRequest};
use crate::spectrum::analysis::{Spectrum, SpectrumAnalyzer};
use crate::synth::buffer::SampleBuffer;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use std::fmt::Debug;
use tracing::{debug, info};

/// Largest power of two not above `n`, if at least 2
fn analysis_length(n: usize) -> Option<usize> {
    if n < 2 {
        return None;
    }
    Some(1 << (usize::BITS - 1 - n.leading_zeros()))
}

pub struct Workbench<D, T, C>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    D::Error: Debug,
    T: RepeatingTimer,
    C: DacChannel,
{
    config: DeviceConfig,
    buffer: SampleBuffer,
    analyzer: SpectrumAnalyzer,
    display: D,
    dac: DacScheduler<T, C>,
    sample_rate: Option<u32>,
    last_output: Option<OutputRequest>,
}

impl<D, T, C> Workbench<D, T, C>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    D::Error: Debug,
    T: RepeatingTimer,
    C: DacChannel,
{
    /// Validate `config`, allocate the sample buffer and prepare the FFT engine
    pub fn new(config: DeviceConfig, display: D, timer: T, channel: C) -> Result<Self> {
        config.validate()?;

        let buffer = SampleBuffer::new(config.sample_count)?;
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.initialize(config.max_fft_size)?;
        let dac = DacScheduler::new(timer, channel, config.dac.clone())?;

        Ok(Self {
            config,
            buffer,
            analyzer,
            display,
            dac,
            sample_rate: None,
            last_output: None,
        })
    }

    /// Replace the waveform in the sample buffer
    ///
    /// A running output session is stopped first and restarted afterwards
    /// with its previous settings, so it picks up the new waveform.
    ///
    /// # Returns
    /// Number of waves actually synthesized
    pub fn configure_waves(&mut self, request: &WaveRequest) -> Result<usize> {
        let descriptors = request.descriptors(self.config.max_waves)?;

        let resume = if self.dac.is_running() {
            self.last_output
        } else {
            None
        };
        self.dac.stop();

        self.buffer.regenerate(&descriptors)?;
        self.sample_rate = Some(request.sample_frequency);
        info!(
            "Synthesized {} of {} waves at {} Hz",
            descriptors.len(),
            request.waves.len(),
            request.sample_frequency
        );

        if let Some(output) = resume {
            self.start_output(&output)?;
        }

        Ok(descriptors.len())
    }

    /// Analyse the sample buffer and plot its log-magnitude spectrum
    ///
    /// The FFT covers the largest power-of-two prefix of the buffer that the
    /// engine supports.
    pub fn run_analysis(&mut self, request: &AnalysisRequest) -> Result<Spectrum> {
        let sample_rate = self.require_sample_rate()?;
        let limit = self.buffer.len().min(self.config.max_fft_size);
        let length = analysis_length(limit)
            .ok_or_else(|| CoreError::invalid("sample buffer too short to analyze"))?;

        let spectrum = self
            .analyzer
            .apply(&self.buffer.as_slice()[..length], request.window)?;
        self.plot_spectrum(&spectrum, sample_rate)?;

        debug!(
            "{} analysis over {} samples, peak bin {:?}",
            request.window, length, spectrum.peak_bin()
        );
        Ok(spectrum)
    }

    /// Low-pass and decimate the sample buffer, then analyse the result
    ///
    /// Filter length, decimation factor and design window come from the
    /// device configuration; `window` is the analysis window.
    pub fn run_decimated_analysis(&mut self, window: WindowKind) -> Result<Spectrum> {
        let sample_rate = self.require_sample_rate()?;
        let settings = &self.config.decimation;

        let coefficients =
            design_decimation_lowpass(settings.taps, settings.factor, settings.window)?;
        let mut decimator = FirDecimator::new(coefficients, settings.factor)?;
        let decimated = decimator.try_process(self.buffer.as_slice())?;

        let limit = decimated.len().min(self.config.max_fft_size);
        let length = analysis_length(limit)
            .ok_or_else(|| CoreError::invalid("decimated signal too short to analyze"))?;

        let spectrum = self.analyzer.apply(&decimated[..length], window)?;
        let decimated_rate = sample_rate / settings.factor as u32;
        self.plot_spectrum(&spectrum, decimated_rate)?;

        debug!(
            "Decimated {} analysis over {} samples at {} Hz, peak bin {:?}",
            window,
            length,
            decimated_rate,
            spectrum.peak_bin()
        );
        Ok(spectrum)
    }

    /// Plot the sample buffer in the time domain
    pub fn show_waveform(&mut self) -> Result<RasterCanvas> {
        render_waveform(
            &mut self.display,
            self.buffer.as_slice(),
            self.config.waveform_bounds,
            &self.config.display,
        )
    }

    /// Stream the current sample buffer to the converter
    ///
    /// Replaces any running session.
    pub fn start_output(&mut self, request: &OutputRequest) -> Result<()> {
        self.dac.start(
            self.buffer.snapshot(),
            request.sample_frequency,
            request.prevent_overflow,
        )?;
        self.last_output = Some(*request);
        Ok(())
    }

    /// Stop streaming; a no-op when idle
    pub fn stop_output(&mut self) {
        self.dac.stop();
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn samples(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    /// Sample rate of the last wave configuration
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn analyzer(&self) -> &SpectrumAnalyzer {
        &self.analyzer
    }

    pub fn output_status(&self) -> DacStatus {
        self.dac.status()
    }

    /// Run `f` with exclusive access to the converter channel
    pub fn with_channel<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R> {
        self.dac.with_channel(f)
    }

    fn require_sample_rate(&self) -> Result<u32> {
        self.sample_rate
            .ok_or_else(|| CoreError::invalid("no waveform configured yet"))
    }

    fn plot_spectrum(&mut self, spectrum: &Spectrum, sample_rate: u32) -> Result<()> {
        render_spectrum(
            &mut self.display,
            &spectrum.log_magnitude,
            sample_rate,
            self.config.spectrum_bounds,
            &self.config.display,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayConfig, RunMode};
    use crate::dac::{code_channel, CodeConsumer, ManualTimer, RingDac};
    use crate::display::framebuffer::FrameBuffer;
    use crate::request::WaveSpec;
    use std::f32::consts::FRAC_PI_2;
    use std::time::Duration;

    type TestBench = Workbench<FrameBuffer, ManualTimer, RingDac>;

    fn bench(config: DeviceConfig) -> (TestBench, ManualTimer, CodeConsumer) {
        let timer = ManualTimer::new();
        let (dac, codes) = code_channel(4096);
        let display = FrameBuffer::new(config.display.width, config.display.height);
        let bench = Workbench::new(config, display, timer.clone(), dac).unwrap();
        (bench, timer, codes)
    }

    fn plain_config() -> DeviceConfig {
        DeviceConfig {
            display: DisplayConfig {
                width: 128,
                height: 64,
                invert: false,
                labels: false,
            },
            ..DeviceConfig::default()
        }
    }

    fn tone(amplitude: f32, frequency: f32, phase: f32, offset: f32) -> WaveSpec {
        WaveSpec {
            amplitude,
            frequency,
            phase,
            offset,
        }
    }

    #[test]
    fn test_analysis_length() {
        assert_eq!(analysis_length(0), None);
        assert_eq!(analysis_length(1), None);
        assert_eq!(analysis_length(2), Some(2));
        assert_eq!(analysis_length(1000), Some(512));
        assert_eq!(analysis_length(1024), Some(1024));
    }

    #[test]
    fn test_analysis_needs_waveform() {
        let (mut bench, _timer, _codes) = bench(plain_config());
        let request = AnalysisRequest {
            window: WindowKind::Hann,
        };
        assert!(matches!(
            bench.run_analysis(&request),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_configure_and_analyse() {
        let (mut bench, _timer, _codes) = bench(plain_config());
        let waves = WaveRequest {
            sample_frequency: 1024,
            waves: vec![tone(1.0, 100.0, 0.0, 0.0), tone(1.0, 5000.0, 0.0, 0.0)],
        };

        // The 5 kHz tone is above the sample rate and is dropped
        assert_eq!(bench.configure_waves(&waves).unwrap(), 1);
        assert_eq!(bench.sample_rate(), Some(1024));

        let spectrum = bench
            .run_analysis(&AnalysisRequest {
                window: WindowKind::BlackmanHarris,
            })
            .unwrap();

        assert_eq!(spectrum.len(), 512);
        assert_eq!(spectrum.peak_bin(), Some(100));
        assert!((spectrum.bin_frequency_hz(100, 1024) - 100.0).abs() < 1e-3);
        assert!(bench.display().count(BinaryColor::On) > 0);
    }

    #[test]
    fn test_analysis_prefix_is_power_of_two() {
        let config = DeviceConfig {
            sample_count: 1000,
            ..plain_config()
        };
        let (mut bench, _timer, _codes) = bench(config);
        bench
            .configure_waves(&WaveRequest {
                sample_frequency: 512,
                waves: vec![tone(1.0, 64.0, 0.0, 0.0)],
            })
            .unwrap();

        let spectrum = bench
            .run_analysis(&AnalysisRequest {
                window: WindowKind::Hann,
            })
            .unwrap();
        assert_eq!(spectrum.fft_len(), 512);
        assert_eq!(spectrum.peak_bin(), Some(64));
    }

    #[test]
    fn test_decimated_analysis() {
        let (mut bench, _timer, _codes) = bench(plain_config());
        bench
            .configure_waves(&WaveRequest {
                sample_frequency: 1024,
                waves: vec![tone(1.0, 100.0, 0.0, 0.0)],
            })
            .unwrap();

        let spectrum = bench
            .run_decimated_analysis(WindowKind::BlackmanHarris)
            .unwrap();

        // 512 samples at 512 Hz: 1 Hz per bin
        assert_eq!(spectrum.fft_len(), 512);
        assert_eq!(spectrum.peak_bin(), Some(100));
    }

    #[test]
    fn test_show_waveform() {
        let (mut bench, _timer, _codes) = bench(plain_config());
        bench
            .configure_waves(&WaveRequest {
                sample_frequency: 1024,
                waves: vec![tone(2.0, 16.0, 0.0, 0.0)],
            })
            .unwrap();

        let canvas = bench.show_waveform().unwrap();
        assert_eq!(canvas.width(), 128);
        for x in 0..canvas.width() {
            assert!(canvas.column_span(x).is_some(), "column {} blank", x);
        }
        assert_eq!(
            bench.display().count(BinaryColor::On),
            canvas.marked_count()
        );
    }

    #[test]
    fn test_reconfigure_restarts_output_without_overlap() {
        let (mut bench, timer, mut codes) = bench(plain_config());
        bench
            .configure_waves(&WaveRequest {
                sample_frequency: 1024,
                waves: vec![tone(1.0, 8.0, 0.0, 1.65)],
            })
            .unwrap();
        bench
            .start_output(&OutputRequest {
                sample_frequency: 200,
                prevent_overflow: true,
            })
            .unwrap();
        timer.fire_n(10);

        bench
            .configure_waves(&WaveRequest {
                sample_frequency: 1024,
                waves: vec![tone(1.0, 4.0, 0.0, 1.65)],
            })
            .unwrap();

        assert_eq!(timer.arm_count(), 2);
        assert!(timer.peak_streams() <= 1);
        assert!(bench.output_status().running);
        assert_eq!(bench.output_status().emitted, 0);
        assert_eq!(timer.period(), Some(Duration::from_micros(5000)));

        timer.fire_n(10);
        assert_eq!(codes.drain().len(), 20);
    }

    #[test]
    fn test_reconfigure_leaves_stopped_output_stopped() {
        let (mut bench, timer, _codes) = bench(plain_config());
        let waves = WaveRequest {
            sample_frequency: 1024,
            waves: vec![tone(1.0, 8.0, 0.0, 0.0)],
        };
        bench.configure_waves(&waves).unwrap();
        bench
            .start_output(&OutputRequest {
                sample_frequency: 200,
                prevent_overflow: false,
            })
            .unwrap();
        bench.stop_output();
        bench.stop_output();

        bench.configure_waves(&waves).unwrap();
        assert_eq!(timer.arm_count(), 1);
        assert!(!bench.output_status().running);
    }

    #[test]
    fn test_output_clamps_to_code_limits() {
        let config = DeviceConfig {
            dac: crate::config::DacConfig {
                run_mode: RunMode::Samples(4),
                ..Default::default()
            },
            ..plain_config()
        };
        let (mut bench, timer, mut codes) = bench(config);

        // Alternates between +10 and -10
        bench
            .configure_waves(&WaveRequest {
                sample_frequency: 1000,
                waves: vec![tone(10.0, 500.0, FRAC_PI_2, 0.0)],
            })
            .unwrap();
        bench
            .start_output(&OutputRequest {
                sample_frequency: 1000,
                prevent_overflow: true,
            })
            .unwrap();

        assert_eq!(timer.fire_n(10), 4);
        assert_eq!(codes.drain(), vec![255, 0, 255, 0]);
        assert!(!bench.output_status().running);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DeviceConfig {
            sample_count: 0,
            ..DeviceConfig::default()
        };
        let (dac, _codes) = code_channel(8);
        let result = TestBench::new(config, FrameBuffer::new(8, 8), ManualTimer::new(), dac);
        assert!(result.is_err());
    }
}
