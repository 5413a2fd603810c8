//! Benchmarks for low-level DSP primitives.

mod envelope;
mod mix;
mod noise;
mod oscillator;
mod sampler;

pub use envelope::bench_envelope;
pub use mix::bench_mix;
pub use noise::bench_noise;
pub use oscillator::bench_oscillator;
pub use sampler::bench_sampler;
