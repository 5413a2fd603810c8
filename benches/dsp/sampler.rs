//! Benchmarks for interpolated sample playback.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use pulse_dsp::dsp::sampler::{SampleData, SamplePlayer, SampleSlot};

use crate::BLOCK_SIZES;

pub fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/sampler");

    // Ten seconds of material so playback never reaches the end
    let slot = Arc::new(SampleSlot::new());
    let samples = (0..441_000).map(|i| (i as f32 * 0.01).sin()).collect();
    slot.store(SampleData::new(samples, 44_100.0, "sine"));

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Native rate with no tuning still goes through the interpolator
        let mut player = SamplePlayer::new(44_100.0, Arc::clone(&slot));
        player.trigger(1.0);
        group.bench_with_input(BenchmarkId::new("unity", size), &size, |b, _| {
            b.iter(|| {
                if !player.render(black_box(&mut buffer)) {
                    player.trigger(1.0);
                }
            })
        });

        let mut player = SamplePlayer::new(48_000.0, Arc::clone(&slot));
        player.tune = -7.0;
        player.trigger(1.0);
        group.bench_with_input(BenchmarkId::new("tuned_resampled", size), &size, |b, _| {
            b.iter(|| {
                if !player.render(black_box(&mut buffer)) {
                    player.trigger(1.0);
                }
            })
        });
    }

    group.finish();
}
