//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use seed_synth::dsp::{FilterMode, SVFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, mode) in [
            ("lowpass", FilterMode::LowPass),
            ("bandpass", FilterMode::BandPass),
            ("highpass", FilterMode::HighPass),
            ("notch", FilterMode::Notch),
        ] {
            let mut filter = SVFilter::new(SAMPLE_RATE, 1_000.0, 0.5);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(mode));
                })
            });
        }

        // Cutoff sweep: one coefficient update per block
        let mut filter = SVFilter::lowpass(SAMPLE_RATE, 1_000.0);
        let mut buffer = input.clone();
        let mut cutoff = 200.0f32;
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 8_000.0 { 200.0 } else { cutoff * 1.01 };
                filter.set_cutoff(black_box(cutoff));
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), FilterMode::LowPass);
            })
        });
    }

    group.finish();
}
