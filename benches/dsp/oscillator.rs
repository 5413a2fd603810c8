//! Benchmarks for the band-limited synth oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_dsp::dsp::oscillator::{SynthOscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let waveforms = [
        ("sine", Waveform::Sine),
        ("triangle", Waveform::Triangle),
        ("saw_blep", Waveform::Saw),
        ("square_blep", Waveform::Square),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut osc = SynthOscillator::new(48_000.0);
            osc.waveform = waveform;
            osc.trigger(1.0, 440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| osc.render(black_box(&mut buffer)))
            });
        }
    }

    group.finish();
}
