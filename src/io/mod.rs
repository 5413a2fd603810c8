// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;
pub mod wav;

use std::path::Path;

use crate::error::LoadError;

pub use wav::WavDecoder;

/// Caller-owned output buffers, one `Vec` per channel.
///
/// Channel 0 is left (or mono), channel 1 is right. The engine only ever
/// adds into these buffers, so clear them before each block.
#[derive(Debug, Default)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn mono(frames: usize) -> Self {
        Self::new(1, frames)
    }

    pub fn stereo(frames: usize) -> Self {
        Self::new(2, frames)
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    pub fn num_frames(&self) -> usize {
        self.buffers.first().map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        for buf in &mut self.buffers {
            buf.fill(0.0);
        }
    }

    /// Change the frame count and zero every channel.
    ///
    /// Does not allocate while `frames` stays within the capacity the
    /// buffers were created with.
    pub fn resize(&mut self, frames: usize) {
        for buf in &mut self.buffers {
            buf.clear();
            buf.resize(frames, 0.0);
        }
    }
}

/// Decoded PCM, one `Vec` per channel.
#[derive(Debug, Clone, Default)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// Turns a file into PCM. Runs on the control thread only.
pub trait SampleDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, LoadError>;
}
