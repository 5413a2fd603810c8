/*
Sample Playback
===============

Each part layers two sample players. A player reads a mono buffer at a
fractional position so the sample can be pitched up and down.

Playback Rate
-------------

    rate = (native_rate / host_rate) * 2^(tune / 12)

The first factor corrects for files recorded at a different sample rate
than the host runs at; the second is the tuning knob in semitones. Each
output sample reads the buffer at `position` and then advances it by `rate`.

Linear Interpolation
--------------------

A fractional position falls between two stored samples:

    idx  = floor(position)
    frac = position - idx
    out  = data[idx] * (1 - frac) + data[idx + 1] * frac

The player stops once `position` reaches the last sample (length - 1),
zeroes the rest of the block, and stays silent until the next trigger.


Hot Swapping
------------

Samples are loaded on the control thread while the audio thread may be in
the middle of reading the old one. The buffer lives behind an
`ArcSwapOption<SampleData>`:

  - the loader builds a complete `SampleData` and publishes it in one
    atomic swap;
  - the audio thread loads a guard, which is either the old or the new
    buffer, never a partially built one;
  - the old buffer is freed when its last reference is released.

A failed load never touches the slot, so the previous sample keeps playing.
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::{
    error::LoadError,
    io::{DecodedAudio, SampleDecoder},
};

/// An immutable mono sample.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub samples: Vec<f32>,
    /// Rate the file was recorded at.
    pub sample_rate: f32,
    pub name: String,
    /// File the sample was loaded from, kept for kit persistence.
    pub path: Option<PathBuf>,
}

impl SampleData {
    pub fn new(samples: Vec<f32>, sample_rate: f32, name: impl Into<String>) -> Self {
        Self {
            samples,
            sample_rate,
            name: name.into(),
            path: None,
        }
    }

    /// Build a mono sample from decoder output, averaging all channels.
    pub fn from_decoded(decoded: DecodedAudio, path: &Path) -> Result<Self, LoadError> {
        let DecodedAudio {
            channels,
            sample_rate,
        } = decoded;

        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        if frames == 0 {
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        let samples = if channels.len() == 1 {
            channels.into_iter().next().unwrap_or_default()
        } else {
            let scale = 1.0 / channels.len() as f32;
            (0..frames)
                .map(|i| channels.iter().map(|ch| ch[i]).sum::<f32>() * scale)
                .collect()
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            samples,
            sample_rate: sample_rate as f32,
            name,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    fn interpolate(&self, position: f64) -> f32 {
        if position.is_nan() || position < 0.0 {
            return 0.0;
        }
        let data = &self.samples;
        let idx = position as usize;
        let frac = (position - idx as f64) as f32;

        if idx + 1 >= data.len() {
            return data[idx.min(data.len() - 1)];
        }
        data[idx] * (1.0 - frac) + data[idx + 1] * frac
    }
}

/// Shared, atomically replaceable home for one sample.
///
/// The control thread keeps an `Arc<SampleSlot>` and loads into it; the
/// player on the audio thread reads from the same slot.
#[derive(Default)]
pub struct SampleSlot {
    current: ArcSwapOption<SampleData>,
}

impl SampleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new sample, replacing whatever was loaded.
    pub fn store(&self, data: SampleData) {
        self.current.store(Some(Arc::new(data)));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }

    /// Decode `path` and swap it in. On error the previous sample is kept.
    pub fn load(&self, path: &Path, decoder: &dyn SampleDecoder) -> Result<(), LoadError> {
        let decoded = decoder.decode(path)?;
        let data = SampleData::from_decoded(decoded, path)?;
        log::info!(
            "loaded sample {} ({} frames @ {} Hz)",
            data.name,
            data.len(),
            data.sample_rate
        );
        self.store(data);
        Ok(())
    }

    /// Restore helper: empty paths are ignored, failures are logged and
    /// leave the slot untouched.
    pub fn load_from_path(&self, path: &Path, decoder: &dyn SampleDecoder) {
        if path.as_os_str().is_empty() {
            return;
        }
        if let Err(err) = self.load(path, decoder) {
            log::warn!("keeping previous sample: {err}");
        }
    }

    pub fn current(&self) -> Option<Arc<SampleData>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    pub fn file_name(&self) -> Option<String> {
        self.current.load().as_ref().map(|s| s.name.clone())
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.current.load().as_ref().and_then(|s| s.path.clone())
    }
}

pub struct SamplePlayer {
    pub level: f32,
    /// Semitones, -24 to +24.
    pub tune: f32,
    /// Start offset as a fraction of the sample length.
    pub start: f32,

    slot: Arc<SampleSlot>,
    host_rate: f64,
    position: f64,
    velocity: f32,
    playing: bool,
}

impl SamplePlayer {
    pub fn new(sample_rate: f32, slot: Arc<SampleSlot>) -> Self {
        Self {
            level: 1.0,
            tune: 0.0,
            start: 0.0,
            slot,
            host_rate: f64::from(sample_rate),
            position: 0.0,
            velocity: 0.0,
            playing: false,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.host_rate = f64::from(sample_rate);
        self.position = 0.0;
        self.playing = false;
    }

    pub fn slot(&self) -> &Arc<SampleSlot> {
        &self.slot
    }

    #[inline]
    fn playback_rate(&self, sample: &SampleData) -> f64 {
        (f64::from(sample.sample_rate) / self.host_rate) * 2.0_f64.powf(f64::from(self.tune) / 12.0)
    }

    /// Start from the configured offset. Does nothing if no sample is loaded.
    pub fn trigger(&mut self, velocity: f32) {
        let guard = self.slot.current.load();
        let Some(sample) = guard.as_ref().filter(|s| !s.is_empty()) else {
            return;
        };

        let start = if self.start.is_finite() {
            self.start.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.velocity = velocity;
        self.position = f64::from(start) * sample.len() as f64;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Overwrite `out` with playback. Returns true if any of the block played.
    pub fn render(&mut self, out: &mut [f32]) -> bool {
        if !self.playing {
            out.fill(0.0);
            return false;
        }

        let guard = self.slot.current.load();
        let Some(sample) = guard.as_ref().filter(|s| !s.is_empty()) else {
            self.playing = false;
            out.fill(0.0);
            return false;
        };

        // Re-derived every block so tune edits are heard mid-note
        let rate = self.playback_rate(sample);
        let last = (sample.len() - 1) as f64;
        let gain = self.level * self.velocity;

        for i in 0..out.len() {
            if self.position >= last {
                self.playing = false;
                out[i..].fill(0.0);
                return i > 0;
            }

            out[i] = sample.interpolate(self.position) * gain;
            self.position += rate;
        }

        true
    }
}
