//! Benchmarks for the oscillator → envelope → filter chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use seed_synth::{
    synth::{GateSnapshot, Voice},
    EngineConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    let held = GateSnapshot {
        frequency_hz: 110.0,
        gate: true,
        triggered: false,
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // mono synth patch: saw → ADSR → resonant lowpass
        let mut mono = Voice::new(SAMPLE_RATE, &EngineConfig::mono_synth(SAMPLE_RATE).voice);
        group.bench_with_input(BenchmarkId::new("mono_synth", size), &size, |b, _| {
            b.iter(|| mono.render(black_box(&mut buffer), black_box(held)))
        });

        // Retrigger and new pitch on every block
        let mut plucked = Voice::new(SAMPLE_RATE, &EngineConfig::sequencer(SAMPLE_RATE).voice);
        let mut note = 0u32;
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                note = (note + 1) % 12;
                let snapshot = GateSnapshot {
                    frequency_hz: 220.0 * (1.0 + note as f32 / 12.0),
                    gate: true,
                    triggered: true,
                };
                plucked.render(black_box(&mut buffer), snapshot);
            })
        });
    }

    group.finish();
}
