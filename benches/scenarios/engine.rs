//! Benchmarks for the render engine, one interleaved stereo callback at a time.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use seed_synth::{
    engine::{self, control::ManualClock},
    EngineConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut output = vec![0.0f32; size * 2];

        for (name, config) in [
            ("sine_wave", EngineConfig::sine_wave(SAMPLE_RATE)),
            ("sequencer", EngineConfig::sequencer(SAMPLE_RATE)),
            ("feedback_delay", EngineConfig::feedback_delay(SAMPLE_RATE)),
        ] {
            let (mut render, mut control) = engine::build(&config, ManualClock::new(0), None).unwrap();
            // open the first step so the voice is sounding
            control.poll();

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| render.render_interleaved(black_box(&input), 1, black_box(&mut output), 2))
            });
        }
    }

    group.finish();
}
