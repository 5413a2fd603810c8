//! Benchmarks for the envelope multiply-accumulate and pan helpers.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_dsp::dsp::mix;

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let source: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let envelope: Vec<f32> = (0..size).map(|i| 1.0 - i as f32 / size as f32).collect();
        let mut output = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("multiply_accumulate", size), &size, |b, _| {
            b.iter(|| {
                mix::multiply_accumulate(
                    black_box(&mut output),
                    black_box(&source),
                    black_box(&envelope),
                );
            })
        });

        group.bench_with_input(BenchmarkId::new("pan_accumulate", size), &size, |b, _| {
            b.iter(|| {
                let (left, _right) = mix::pan_gains(black_box(0.3));
                mix::accumulate_scaled(black_box(&mut output), black_box(&source), left);
            })
        });
    }

    group.finish();
}
