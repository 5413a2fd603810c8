//! Low-level DSP primitives used by the drum voices.
//!
//! These components are allocation-free once prepared and realtime-safe,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; routing and parameter handling live in
//! `synth`.

/// Pressure to dampening and re-strike detection.
pub mod aftertouch;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Four envelopes rendered side by side for per-source routing.
pub mod envelope_bank;
/// Multiply-accumulate and pan law helpers.
pub mod mix;
/// White, pink and metallic noise with a tone filter.
pub mod noise;
/// Band-limited synth oscillator.
pub mod oscillator;
/// Pitched playback of hot-swappable mono samples.
pub mod sampler;

pub use aftertouch::AftertouchProcessor;
pub use envelope::{AdsrParams, Envelope, EnvelopeStage};
pub use envelope_bank::EnvelopeBank;
pub use noise::{NoiseGenerator, NoiseType};
pub use oscillator::{SynthOscillator, Waveform};
pub use sampler::{SampleData, SamplePlayer, SampleSlot};
