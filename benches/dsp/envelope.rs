//! Benchmarks for the ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use seed_synth::dsp::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Held gate: mostly sustain after the first few blocks
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.1, 0.7, 0.2);
        group.bench_with_input(BenchmarkId::new("gate_held", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer), black_box(true)))
        });

        // Gate toggling every block: attack and release ramps
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.001, 0.01, 0.5, 0.01);
        let mut gate = false;
        group.bench_with_input(BenchmarkId::new("gate_toggling", size), &size, |b, _| {
            b.iter(|| {
                gate = !gate;
                env.render(black_box(&mut buffer), black_box(gate));
            })
        });
    }

    group.finish();
}
