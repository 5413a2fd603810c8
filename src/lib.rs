pub mod dsp;
pub mod error;
pub mod io;
pub mod params; // Lock-free parameter store shared with the control thread
#[cfg(feature = "serde")]
pub mod state; // Kit persistence (sample paths + parameter values)
pub mod synth; // Voices, engine and event routing

pub use error::{LoadError, StateError};
pub use synth::engine::{DrumEngine, EngineConfig, EngineHandle};
pub use synth::message::DrumEvent;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Number of independent drum parts in a kit.
pub const NUM_PARTS: usize = 4;
/// Envelopes available to each part.
pub const NUM_ENVELOPES: usize = 4;
/// Sound sources per part: sample 1, sample 2, synth, noise.
pub const NUM_SOURCES: usize = 4;

/// General MIDI drum notes that address parts 0..4 on channel 10.
pub const GM_NOTE_MAP: [u8; NUM_PARTS] = [36, 38, 42, 46];
pub const PART_NAMES: [&str; NUM_PARTS] = ["KICK", "SNARE", "HAT", "PERC"];
