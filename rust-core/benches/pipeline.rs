//! Benchmarks for the synthesis, analysis and rendering path
//!
//! Run with: cargo bench -p wavescope-core --bench pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wavescope::{rasterize, synthesize, AxisBounds, SpectrumAnalyzer, WaveDescriptor, WindowKind};

fn tones() -> Vec<WaveDescriptor> {
    [(1.0, 0.05), (0.5, 0.125), (0.25, 0.3)]
        .iter()
        .filter_map(|&(amplitude, frequency)| WaveDescriptor::new(amplitude, frequency, 0.0, 0.0).ok())
        .collect()
}

fn bench_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis");
    let descriptors = tones();

    for size in [256usize, 1024, 4096] {
        let mut buffer = vec![0.0f32; size];
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("three_tones", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                synthesize(black_box(&descriptors), &mut buffer)
            })
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let mut analyzer = SpectrumAnalyzer::new();
    if analyzer.initialize(4096).is_err() {
        return;
    }

    for size in [256usize, 1024, 4096] {
        let mut samples = vec![0.0f32; size];
        if synthesize(&tones(), &mut samples).is_err() {
            continue;
        }
        group.throughput(Throughput::Elements(size as u64));

        for window in [WindowKind::Hann, WindowKind::BlackmanHarris, WindowKind::FlatTop] {
            group.bench_with_input(BenchmarkId::new(window.name(), size), &size, |b, _| {
                b.iter(|| analyzer.apply(black_box(&samples), window))
            });
        }
    }

    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    let bounds = AxisBounds { min: 0.0, max: 50.0 };

    for size in [512usize, 2048] {
        let series: Vec<f32> = (0..size).map(|i| (i % 50) as f32).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("oled_128x64", size), &size, |b, _| {
            b.iter(|| rasterize(black_box(&series), 128, 64, bounds))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_synthesis, bench_analysis, bench_rasterize);
criterion_main!(benches);
