//! Criterion benchmarks for barrido-analysis components
//!
//! Run with: cargo bench -p barrido-analysis

#![allow(missing_docs)]

use std::hint::black_box;

use barrido_analysis::{
    convolve::circular_convolve,
    fft::Fft,
    resample::{resample, resample_impulse_response},
    sweep::{NovakSweep, SweepParameters},
};
use barrido_core::Signal;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const SAMPLE_RATE: f64 = 48000.0;

fn sweep(length: usize) -> NovakSweep {
    NovakSweep::sine(SweepParameters::new(SAMPLE_RATE, 20.0, 20000.0, length)).unwrap()
}

// ============================================================================
// Sweep benchmarks
// ============================================================================

fn bench_sweep_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep_Generate");

    for &length in &[1usize << 14, 1 << 16, 1 << 18] {
        let sweep = sweep(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, _| {
            b.iter(|| black_box(sweep.generate().unwrap()))
        });
    }

    group.finish();
}

fn bench_sweep_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep_Inverse");

    for &length in &[1usize << 14, 1 << 16, 1 << 18] {
        let sweep = sweep(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, _| {
            b.iter(|| black_box(sweep.generate_inverse(None).unwrap()))
        });
    }

    group.finish();
}

fn bench_deconvolve(c: &mut Criterion) {
    let sweep = sweep(1 << 16);
    let response = sweep.generate().unwrap().map(|x| x + 0.1 * x * x);

    c.bench_function("Deconvolve_64k", |b| {
        b.iter(|| black_box(sweep.deconvolve(black_box(&response)).unwrap()))
    });
}

// ============================================================================
// Primitive benchmarks
// ============================================================================

fn bench_fft_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_Roundtrip");

    for &size in &[1024usize, 4096, 16384, 45694] {
        let fft = Fft::new(size);
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.01).sin()).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let spectrum = fft.forward_real(black_box(&input));
                black_box(fft.inverse_real(&spectrum))
            })
        });
    }

    group.finish();
}

fn bench_circular_convolve(c: &mut Criterion) {
    let signal = sweep(1 << 15).generate().unwrap();
    let filter = Signal::impulse(SAMPLE_RATE, 4096).unwrap();

    c.bench_function("Circular_Convolve_32k", |b| {
        b.iter(|| black_box(circular_convolve(black_box(&signal), &filter).unwrap()))
    });
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resample");
    let input: Vec<f64> = (0..48000).map(|i| (i as f64 * 0.05).sin()).collect();

    for &(p, q) in &[(2usize, 1usize), (1, 2), (4, 1), (160, 147)] {
        group.bench_function(format!("{p}_{q}"), |b| {
            b.iter(|| black_box(resample(black_box(&input), p, q, 0)))
        });
    }

    let ir = Signal::impulse(SAMPLE_RATE, 4096).unwrap();
    group.bench_function("impulse_response_x4", |b| {
        b.iter(|| black_box(resample_impulse_response(&ir, SAMPLE_RATE * 4.0).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sweep_generate,
    bench_sweep_inverse,
    bench_deconvolve,
    bench_fft_roundtrip,
    bench_circular_convolve,
    bench_resample,
);

criterion_main!(benches);
