//! Host simulator: synthesize tones, analyse them, draw the result and
//! optionally stream the buffer through a simulated converter.
//!
//! Run with: cargo run --bin wavescope-sim -- --tones 1000,2500 --window HANN_F32

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wavescope::dac::{code_channel, ThreadTimer};
use wavescope::{
    AnalysisRequest, DeviceConfig, FrameBuffer, OutputRequest, RunMode, WaveRequest, WaveSpec,
    WindowKind, Workbench,
};

/// What to draw on the simulated panel
#[derive(ValueEnum, Clone, Copy, Debug)]
enum View {
    Spectrum,
    Waveform,
    Decimated,
}

#[derive(Parser, Debug)]
#[command(name = "wavescope-sim")]
#[command(about = "Synthesize, analyse and stream test tones off-target", long_about = None)]
struct Args {
    /// Comma-separated tone frequencies in Hz
    #[arg(long, value_name = "HZ,...", value_delimiter = ',', default_value = "1000")]
    tones: Vec<f32>,

    /// Amplitude of every tone
    #[arg(long, default_value = "1.0")]
    amplitude: f32,

    /// DC offset added by every tone
    #[arg(long, default_value = "0.0")]
    offset: f32,

    /// Sampling frequency of the synthesized buffer
    #[arg(long, value_name = "HZ", default_value = "8000")]
    sample_rate: u32,

    /// Analysis window wire name (HANN_F32, BLACKMAN_F32, BLACKMAN_HARRIS_F32, ...)
    #[arg(long, default_value = "BLACKMAN_HARRIS_F32")]
    window: String,

    #[arg(long, value_enum, default_value = "spectrum")]
    view: View,

    /// Draw marked pixels as lit instead of using the panel's inverted polarity
    #[arg(long)]
    no_invert: bool,

    /// Stream this many samples through the converter after drawing
    #[arg(long, value_name = "COUNT")]
    stream: Option<u64>,

    /// Converter output rate
    #[arg(long, value_name = "HZ", default_value = "200")]
    output_rate: u32,

    /// Clamp samples into the converter range before scaling
    #[arg(long)]
    prevent_overflow: bool,

    /// Play streamed codes on the default audio output
    #[cfg(feature = "cpal")]
    #[arg(long)]
    play: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = DeviceConfig::default();
    config.display.invert = !args.no_invert;
    if let Some(count) = args.stream {
        config.dac.run_mode = RunMode::Samples(count);
    }
    config.validate()?;

    let capacity = args.stream.unwrap_or(1).clamp(1, 1 << 20) as usize;
    let (dac, codes) = code_channel(capacity);
    let display = FrameBuffer::new(config.display.width, config.display.height);
    let mut bench = Workbench::new(config, display, ThreadTimer::default(), dac)?;

    let waves = WaveRequest {
        sample_frequency: args.sample_rate,
        waves: args
            .tones
            .iter()
            .map(|&frequency| WaveSpec {
                amplitude: args.amplitude,
                frequency,
                phase: 0.0,
                offset: args.offset,
            })
            .collect(),
    };
    let kept = bench.configure_waves(&waves)?;
    if kept == 0 {
        warn!("No tone survived validation, the buffer is silent");
    }

    let window = AnalysisRequest::from_window_name(&args.window)?.window;
    match args.view {
        View::Spectrum => report_spectrum(&bench.run_analysis(&AnalysisRequest { window })?, window, args.sample_rate),
        View::Decimated => {
            let factor = bench.config().decimation.factor as u32;
            report_spectrum(&bench.run_decimated_analysis(window)?, window, args.sample_rate / factor)
        }
        View::Waveform => {
            bench.show_waveform()?;
        }
    }

    let (on, off) = if bench.config().display.invert {
        (' ', '#')
    } else {
        ('#', ' ')
    };
    println!("{}", bench.display().to_ascii(on, off));

    let Some(count) = args.stream else {
        return Ok(());
    };

    #[cfg(feature = "cpal")]
    let (_sink, codes) = if args.play {
        let sink = wavescope::dac::cpal_sink::CpalDacSink::from_default_device(codes, args.output_rate)?;
        sink.start()?;
        (Some(sink), None)
    } else {
        (None, Some(codes))
    };
    #[cfg(not(feature = "cpal"))]
    let codes = Some(codes);

    let request = OutputRequest {
        sample_frequency: args.output_rate,
        prevent_overflow: args.prevent_overflow,
    };
    bench.start_output(&request)?;

    let expected = Duration::from_secs_f64(count as f64 / f64::from(args.output_rate.max(1)));
    let deadline = Instant::now() + expected + Duration::from_secs(1);
    while bench.output_status().running && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    let status = bench.output_status();
    bench.stop_output();
    info!("Streamed {} of {} samples", status.emitted, count);

    if let Some(mut codes) = codes {
        let written = codes.drain();
        let preview: Vec<String> = written.iter().take(32).map(u8::to_string).collect();
        let more = if written.len() > preview.len() { " ..." } else { "" };
        println!("{} codes: {}{}", written.len(), preview.join(" "), more);
    }
    Ok(())
}

fn report_spectrum(spectrum: &wavescope::Spectrum, window: WindowKind, sample_rate: u32) {
    match spectrum.peak_bin() {
        Some(bin) => info!(
            "Peak at bin {} ({:.1} Hz), {:.1} dB, amplitude ~{:.3}",
            bin,
            spectrum.bin_frequency_hz(bin, sample_rate),
            spectrum.log_magnitude[bin],
            spectrum.tone_amplitude(bin, window).unwrap_or(0.0)
        ),
        None => info!("Empty spectrum"),
    }
}
