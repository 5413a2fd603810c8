//! Benchmarks for the ADSR envelope and the four-envelope bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_dsp::dsp::{
    envelope::{AdsrParams, Envelope},
    envelope_bank::EnvelopeBank,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> AdsrParams {
    AdsrParams {
        attack,
        decay,
        sustain,
        release,
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Long attack keeps the ramp running for the whole benchmark
        let mut env = Envelope::with_params(SAMPLE_RATE, adsr(1_000.0, 0.1, 0.7, 0.3));
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        let mut env = Envelope::with_params(SAMPLE_RATE, adsr(0.001, 0.001, 0.7, 0.3));
        env.trigger();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        // Four streams, one block each: the per-part envelope cost
        let mut bank = EnvelopeBank::new(SAMPLE_RATE, size);
        bank.set_params(&[adsr(1_000.0, 0.3, 0.5, 0.4); 4]);
        bank.trigger_all();
        group.bench_with_input(BenchmarkId::new("bank", size), &size, |b, &size| {
            b.iter(|| bank.render(black_box(size)))
        });
    }

    group.finish();
}
