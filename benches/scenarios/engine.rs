//! Benchmarks for complete engine blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_dsp::{
    dsp::sampler::SampleData,
    io::AudioOutput,
    params::{AdsrField, ParamId},
    DrumEngine, DrumEvent, EngineConfig, NUM_PARTS,
};

use crate::BLOCK_SIZES;

fn hit(part: usize) -> DrumEvent {
    DrumEvent::NoteOn {
        channel: part as u8 + 1,
        note: 60,
        velocity: 1.0,
    }
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let config = EngineConfig {
        sample_rate: 48_000.0,
        max_block_size: 512,
    };

    for &size in BLOCK_SIZES {
        let mut output = AudioOutput::stereo(size);

        // === IDLE ===
        // Nothing triggered: the cost of routing and snapshots alone
        let (mut engine, _handle) = DrumEngine::new(config);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                output.clear();
                engine.process_block(black_box(&mut output), &[]);
            })
        });

        // === FULL KIT ===
        // Every part sounding with both samples loaded and metallic noise
        let (mut engine, handle) = DrumEngine::new(config);
        for part in 0..NUM_PARTS {
            for slot in 0..2 {
                if let Some(s) = handle.sample_slot(part, slot) {
                    let data = (0..480_000).map(|i| (i as f32 * 0.003).sin()).collect();
                    s.store(SampleData::new(data, 44_100.0, "tone"));
                }
            }
            // 2 = metallic
            handle.set_param(part, ParamId::NoiseType, 2.0);
            handle.set_param(part, ParamId::NoiseLevel, 0.5);
            for index in 0..4 {
                handle.set_param(
                    part,
                    ParamId::Envelope {
                        index,
                        field: AdsrField::Sustain,
                    },
                    0.8,
                );
            }
        }
        let hits: Vec<_> = (0..NUM_PARTS).map(hit).collect();
        engine.process_block(&mut output, &hits);

        group.bench_with_input(BenchmarkId::new("full_kit", size), &size, |b, _| {
            b.iter(|| {
                output.clear();
                engine.process_block(black_box(&mut output), &[]);
            })
        });
    }

    group.finish();
}
