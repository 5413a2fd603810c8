//! Benchmarks for the noise generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_dsp::dsp::noise::{NoiseGenerator, NoiseType};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    let types = [
        ("white", NoiseType::White),
        ("pink", NoiseType::Pink),
        ("metallic", NoiseType::Metallic),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, noise_type) in types {
            let mut noise = NoiseGenerator::new(1);
            noise.noise_type = noise_type;
            noise.filter_cutoff = 0.5;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| noise.render(black_box(&mut buffer)))
            });
        }
    }

    group.finish();
}
