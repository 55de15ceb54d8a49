//! Benchmarks for the delay line and the feedback delay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use seed_synth::dsp::{DelaySettings, FeedbackDelay};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let capacity = SAMPLE_RATE as usize + 1;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| ((i % 32) as f32 / 16.0) - 1.0).collect();
        let mut buffer = input.clone();

        // 500 ms echo, integer delay
        let mut echo = FeedbackDelay::new(
            capacity,
            DelaySettings {
                delay_samples: SAMPLE_RATE * 0.5,
                feedback: 0.5,
                mix: 0.5,
            },
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("echo_500ms", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                echo.render(black_box(&mut buffer));
            })
        });

        // Fractional delay: interpolated reads
        let mut fractional = FeedbackDelay::new(
            capacity,
            DelaySettings {
                delay_samples: 1_234.5,
                feedback: 0.3,
                mix: 0.5,
            },
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("fractional", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                fractional.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
