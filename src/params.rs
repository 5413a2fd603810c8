//! Lock-free parameter store.
//!
//! Every parameter is a single `f32` stored as bits in an `AtomicU32`. The
//! control thread writes whenever a knob moves; the audio thread reads each
//! part's values once per block into a plain [`PartSnapshot`]. Individual
//! values are atomic but a snapshot is not: a block may see one knob's new
//! value next to another's old one, which is fine for perceptual controls.
//!
//! Ids mirror the host-facing layout: `p{part}_{key}`, e.g. `p1_s1_lvl` or
//! `p3_env2_a`, where parts and envelopes are numbered from 1.

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{aftertouch::AftertouchConfig, envelope::AdsrParams, noise::NoiseType, oscillator::Waveform},
    NUM_ENVELOPES, NUM_PARTS, NUM_SOURCES,
};

/// Frequency used when the synth frequency parameter holds no usable value.
pub const FALLBACK_SYNTH_FREQUENCY: f32 = 60.0;

/// An `f32` that can be shared between threads without locking.
#[derive(Debug)]
pub struct AtomicParam(AtomicU32);

impl AtomicParam {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// The four sound sources of a part, in mixing order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Sample1,
    Sample2,
    Synth,
    Noise,
}

impl SourceKind {
    pub const ALL: [SourceKind; NUM_SOURCES] = [
        SourceKind::Sample1,
        SourceKind::Sample2,
        SourceKind::Synth,
        SourceKind::Noise,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    fn key(self) -> &'static str {
        match self {
            SourceKind::Sample1 => "s1",
            SourceKind::Sample2 => "s2",
            SourceKind::Synth => "syn",
            SourceKind::Noise => "nse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdsrField {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl AdsrField {
    const ALL: [AdsrField; 4] = [
        AdsrField::Attack,
        AdsrField::Decay,
        AdsrField::Sustain,
        AdsrField::Release,
    ];

    fn key(self) -> &'static str {
        match self {
            AdsrField::Attack => "a",
            AdsrField::Decay => "d",
            AdsrField::Sustain => "s",
            AdsrField::Release => "r",
        }
    }
}

/// Identifies one parameter of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    SampleLevel(usize),
    SampleTune(usize),
    SampleStart(usize),
    SynthWave,
    SynthLevel,
    SynthTune,
    SynthPulseWidth,
    SynthFreq,
    NoiseType,
    NoiseLevel,
    NoiseFilter,
    NoiseTone,
    AftertouchDampen,
    AftertouchRetrigger,
    Volume,
    Pan,
    Mute,
    Solo,
    Envelope { index: usize, field: AdsrField },
    EnvAssign(SourceKind),
}

const SAMPLE_BASE: usize = 0;
const SYNTH_BASE: usize = 6;
const NOISE_BASE: usize = 11;
const AFTERTOUCH_BASE: usize = 15;
const MIX_BASE: usize = 17;
const ENVELOPE_BASE: usize = 21;
const ASSIGN_BASE: usize = ENVELOPE_BASE + NUM_ENVELOPES * 4;

/// Number of parameters per part.
pub const PARAM_COUNT: usize = ASSIGN_BASE + NUM_SOURCES;

impl ParamId {
    /// False when a sample slot or envelope index is out of range.
    pub fn is_valid(self) -> bool {
        match self {
            ParamId::SampleLevel(slot) | ParamId::SampleTune(slot) | ParamId::SampleStart(slot) => {
                slot < 2
            }
            ParamId::Envelope { index, .. } => index < NUM_ENVELOPES,
            _ => true,
        }
    }

    /// Dense index into a part's parameter table.
    ///
    /// Only meaningful for ids where [`ParamId::is_valid`] holds.
    pub fn index(self) -> usize {
        match self {
            ParamId::SampleLevel(slot) => SAMPLE_BASE + slot * 3,
            ParamId::SampleTune(slot) => SAMPLE_BASE + slot * 3 + 1,
            ParamId::SampleStart(slot) => SAMPLE_BASE + slot * 3 + 2,
            ParamId::SynthWave => SYNTH_BASE,
            ParamId::SynthLevel => SYNTH_BASE + 1,
            ParamId::SynthTune => SYNTH_BASE + 2,
            ParamId::SynthPulseWidth => SYNTH_BASE + 3,
            ParamId::SynthFreq => SYNTH_BASE + 4,
            ParamId::NoiseType => NOISE_BASE,
            ParamId::NoiseLevel => NOISE_BASE + 1,
            ParamId::NoiseFilter => NOISE_BASE + 2,
            ParamId::NoiseTone => NOISE_BASE + 3,
            ParamId::AftertouchDampen => AFTERTOUCH_BASE,
            ParamId::AftertouchRetrigger => AFTERTOUCH_BASE + 1,
            ParamId::Volume => MIX_BASE,
            ParamId::Pan => MIX_BASE + 1,
            ParamId::Mute => MIX_BASE + 2,
            ParamId::Solo => MIX_BASE + 3,
            ParamId::Envelope { index, field } => ENVELOPE_BASE + index * 4 + field as usize,
            ParamId::EnvAssign(source) => ASSIGN_BASE + source.index(),
        }
    }

    /// Inverse of [`ParamId::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        let id = match index {
            0..=5 => match index % 3 {
                0 => ParamId::SampleLevel(index / 3),
                1 => ParamId::SampleTune(index / 3),
                _ => ParamId::SampleStart(index / 3),
            },
            6 => ParamId::SynthWave,
            7 => ParamId::SynthLevel,
            8 => ParamId::SynthTune,
            9 => ParamId::SynthPulseWidth,
            10 => ParamId::SynthFreq,
            11 => ParamId::NoiseType,
            12 => ParamId::NoiseLevel,
            13 => ParamId::NoiseFilter,
            14 => ParamId::NoiseTone,
            15 => ParamId::AftertouchDampen,
            16 => ParamId::AftertouchRetrigger,
            17 => ParamId::Volume,
            18 => ParamId::Pan,
            19 => ParamId::Mute,
            20 => ParamId::Solo,
            i if i < ASSIGN_BASE => {
                let offset = i - ENVELOPE_BASE;
                ParamId::Envelope {
                    index: offset / 4,
                    field: AdsrField::ALL[offset % 4],
                }
            }
            i if i < PARAM_COUNT => ParamId::EnvAssign(SourceKind::ALL[i - ASSIGN_BASE]),
            _ => return None,
        };
        Some(id)
    }

    /// Every parameter of a part, in table order.
    pub fn all() -> impl Iterator<Item = ParamId> {
        (0..PARAM_COUNT).filter_map(ParamId::from_index)
    }

    /// Key within a part, e.g. `s1_lvl` or `env2_a`.
    pub fn key(self) -> String {
        match self {
            ParamId::SampleLevel(slot) => format!("s{}_lvl", slot + 1),
            ParamId::SampleTune(slot) => format!("s{}_tune", slot + 1),
            ParamId::SampleStart(slot) => format!("s{}_start", slot + 1),
            ParamId::SynthWave => "syn_wave".into(),
            ParamId::SynthLevel => "syn_lvl".into(),
            ParamId::SynthTune => "syn_tune".into(),
            ParamId::SynthPulseWidth => "syn_pw".into(),
            ParamId::SynthFreq => "syn_freq".into(),
            ParamId::NoiseType => "nse_type".into(),
            ParamId::NoiseLevel => "nse_lvl".into(),
            ParamId::NoiseFilter => "nse_filt".into(),
            ParamId::NoiseTone => "nse_tone".into(),
            ParamId::AftertouchDampen => "at_damp".into(),
            ParamId::AftertouchRetrigger => "at_retrig".into(),
            ParamId::Volume => "vol".into(),
            ParamId::Pan => "pan".into(),
            ParamId::Mute => "mute".into(),
            ParamId::Solo => "solo".into(),
            ParamId::Envelope { index, field } => format!("env{}_{}", index + 1, field.key()),
            ParamId::EnvAssign(source) => format!("ea_{}", source.key()),
        }
    }

    /// Fully qualified id, e.g. `p1_s1_lvl`.
    pub fn full_id(self, part: usize) -> String {
        format!("p{}_{}", part + 1, self.key())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ParamId::all().find(|id| id.key() == key)
    }

    /// Inclusive value range.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamId::SampleLevel(_)
            | ParamId::SampleStart(_)
            | ParamId::SynthLevel
            | ParamId::NoiseLevel
            | ParamId::NoiseFilter
            | ParamId::NoiseTone
            | ParamId::AftertouchDampen
            | ParamId::AftertouchRetrigger
            | ParamId::Volume
            | ParamId::Mute
            | ParamId::Solo => (0.0, 1.0),
            ParamId::SampleTune(_) | ParamId::SynthTune => (-24.0, 24.0),
            ParamId::SynthWave => (0.0, 3.0),
            ParamId::SynthPulseWidth => (0.05, 0.95),
            ParamId::SynthFreq => (20.0, 2000.0),
            ParamId::NoiseType => (0.0, 2.0),
            ParamId::Pan => (-1.0, 1.0),
            ParamId::Envelope { field, .. } => match field {
                AdsrField::Attack => (0.001, 2.0),
                AdsrField::Sustain => (0.0, 1.0),
                AdsrField::Decay | AdsrField::Release => (0.01, 2.0),
            },
            ParamId::EnvAssign(_) => (0.0, (NUM_ENVELOPES - 1) as f32),
        }
    }

    /// Choices and toggles only take whole-number values.
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            ParamId::SynthWave
                | ParamId::NoiseType
                | ParamId::Mute
                | ParamId::Solo
                | ParamId::EnvAssign(_)
        )
    }

    /// Factory value for this parameter on `part`.
    pub fn default_for(self, part: usize) -> f32 {
        match self {
            ParamId::SampleLevel(0) => 0.8,
            ParamId::SampleLevel(_) => 0.5,
            ParamId::SynthLevel if part == 0 => 0.6,
            ParamId::SynthLevel => 0.3,
            ParamId::SynthPulseWidth => 0.5,
            ParamId::SynthFreq if part == 0 => 60.0,
            ParamId::SynthFreq => 200.0,
            ParamId::NoiseLevel if part == 2 => 0.7,
            ParamId::NoiseLevel => 0.15,
            ParamId::NoiseFilter | ParamId::NoiseTone => 0.5,
            ParamId::AftertouchDampen => 0.7,
            ParamId::AftertouchRetrigger => 0.3,
            ParamId::Volume => 0.8,
            ParamId::Envelope { index, field } => default_envelope(index, field),
            ParamId::EnvAssign(SourceKind::Synth) => 1.0,
            ParamId::EnvAssign(SourceKind::Noise) => 2.0,
            _ => 0.0,
        }
    }

    /// Clamp (and for discrete parameters, round) a value into range.
    pub fn sanitize(self, value: f32) -> f32 {
        let (min, max) = self.range();
        let value = value.clamp(min, max);
        if self.is_discrete() {
            value.round()
        } else {
            value
        }
    }
}

fn default_envelope(index: usize, field: AdsrField) -> f32 {
    let (a, d, s, r) = match index {
        1 => (0.01, 0.15, 0.2, 0.4),
        2 => (0.001, 0.5, 0.0, 0.1),
        _ => (0.01, 0.3, 0.5, 0.4),
    };
    match field {
        AdsrField::Attack => a,
        AdsrField::Decay => d,
        AdsrField::Sustain => s,
        AdsrField::Release => r,
    }
}

#[inline]
fn choice(value: f32, max: usize) -> usize {
    (value.round().max(0.0) as usize).min(max)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSettings {
    pub level: f32,
    pub tune: f32,
    pub start: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthSettings {
    pub waveform: Waveform,
    pub level: f32,
    pub tune: f32,
    pub pulse_width: f32,
    pub frequency: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    pub noise_type: NoiseType,
    pub level: f32,
    pub filter_cutoff: f32,
    pub tone: f32,
}

/// Plain copy of one part's parameters, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartSnapshot {
    pub samples: [SampleSettings; 2],
    pub synth: SynthSettings,
    pub noise: NoiseSettings,
    pub aftertouch: AftertouchConfig,
    pub envelopes: [AdsrParams; NUM_ENVELOPES],
    /// Envelope index driving each source, in [`SourceKind`] order.
    pub env_assign: [usize; NUM_SOURCES],
    pub volume: f32,
    pub pan: f32,
    pub mute: bool,
    pub solo: bool,
}

impl PartSnapshot {
    /// Synth frequency, falling back to 60 Hz when the stored value is unusable.
    pub fn synth_frequency(&self) -> f32 {
        let f = self.synth.frequency;
        if f.is_finite() && f > 0.0 {
            f
        } else {
            FALLBACK_SYNTH_FREQUENCY
        }
    }
}

/// All parameters of one part.
#[derive(Debug)]
pub struct PartParams {
    part: usize,
    values: [AtomicParam; PARAM_COUNT],
}

impl PartParams {
    pub fn new(part: usize) -> Self {
        Self {
            part,
            values: std::array::from_fn(|i| {
                let value = ParamId::from_index(i).map_or(0.0, |id| id.default_for(part));
                AtomicParam::new(value)
            }),
        }
    }

    pub fn part(&self) -> usize {
        self.part
    }

    #[inline]
    fn slot(&self, id: ParamId) -> Option<&AtomicParam> {
        if id.is_valid() {
            self.values.get(id.index())
        } else {
            None
        }
    }

    /// Stored value. Invalid ids read as 0.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.slot(id).map_or(0.0, AtomicParam::get)
    }

    /// Store a value, clamped into the parameter's range. NaN and invalid
    /// ids are ignored.
    pub fn set(&self, id: ParamId, value: f32) {
        if value.is_nan() {
            return;
        }
        if let Some(slot) = self.slot(id) {
            slot.set(id.sanitize(value));
        }
    }

    /// Write a raw value without clamping.
    ///
    /// For hosts that validate elsewhere. Snapshots force every value back
    /// into range, so the audio path tolerates anything stored here.
    pub fn set_raw(&self, id: ParamId, value: f32) {
        if let Some(slot) = self.slot(id) {
            slot.set(value);
        }
    }

    pub fn reset_to_defaults(&self) {
        for id in ParamId::all() {
            self.values[id.index()].set(id.default_for(self.part));
        }
    }

    /// Stored value forced into range. NaN reads as the factory default.
    #[inline]
    fn read(&self, id: ParamId) -> f32 {
        let value = self.get(id);
        if value.is_nan() {
            return id.default_for(self.part);
        }
        let (min, max) = id.range();
        value.clamp(min, max)
    }

    /// Synth frequency in range, or the raw value when it is unusable so
    /// [`PartSnapshot::synth_frequency`] can fall back.
    #[inline]
    fn read_frequency(&self) -> f32 {
        let value = self.get(ParamId::SynthFreq);
        if value.is_finite() && value > 0.0 {
            ParamId::SynthFreq.sanitize(value)
        } else {
            value
        }
    }

    #[inline]
    pub fn is_muted(&self) -> bool {
        self.get(ParamId::Mute) > 0.5
    }

    #[inline]
    pub fn is_soloed(&self) -> bool {
        self.get(ParamId::Solo) > 0.5
    }

    /// Read every value once, forced into range. Allocation-free.
    pub fn snapshot(&self) -> PartSnapshot {
        let sample = |slot| SampleSettings {
            level: self.read(ParamId::SampleLevel(slot)),
            tune: self.read(ParamId::SampleTune(slot)),
            start: self.read(ParamId::SampleStart(slot)),
        };
        let envelope = |index| AdsrParams {
            attack: self.read(ParamId::Envelope {
                index,
                field: AdsrField::Attack,
            }),
            decay: self.read(ParamId::Envelope {
                index,
                field: AdsrField::Decay,
            }),
            sustain: self.read(ParamId::Envelope {
                index,
                field: AdsrField::Sustain,
            }),
            release: self.read(ParamId::Envelope {
                index,
                field: AdsrField::Release,
            }),
        };

        PartSnapshot {
            samples: [sample(0), sample(1)],
            synth: SynthSettings {
                waveform: Waveform::from_index(choice(self.read(ParamId::SynthWave), 3)),
                level: self.read(ParamId::SynthLevel),
                tune: self.read(ParamId::SynthTune),
                pulse_width: self.read(ParamId::SynthPulseWidth),
                frequency: self.read_frequency(),
            },
            noise: NoiseSettings {
                noise_type: NoiseType::from_index(choice(self.read(ParamId::NoiseType), 2)),
                level: self.read(ParamId::NoiseLevel),
                filter_cutoff: self.read(ParamId::NoiseFilter),
                tone: self.read(ParamId::NoiseTone),
            },
            aftertouch: AftertouchConfig {
                dampen_sensitivity: self.read(ParamId::AftertouchDampen),
                retrigger_threshold: self.read(ParamId::AftertouchRetrigger),
            },
            envelopes: std::array::from_fn(envelope),
            env_assign: SourceKind::ALL.map(|source| {
                choice(self.read(ParamId::EnvAssign(source)), NUM_ENVELOPES - 1)
            }),
            volume: self.read(ParamId::Volume),
            pan: self.read(ParamId::Pan),
            mute: self.is_muted(),
            solo: self.is_soloed(),
        }
    }
}

/// Parameters for the whole kit, shared between control and audio threads.
#[derive(Debug)]
pub struct KitParams {
    parts: [PartParams; NUM_PARTS],
}

impl Default for KitParams {
    fn default() -> Self {
        Self {
            parts: std::array::from_fn(PartParams::new),
        }
    }
}

impl KitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(&self, part: usize) -> &PartParams {
        &self.parts[part]
    }

    pub fn parts(&self) -> &[PartParams; NUM_PARTS] {
        &self.parts
    }

    /// Look up a fully qualified id such as `p2_env3_r`.
    pub fn find(&self, full_id: &str) -> Option<(usize, ParamId)> {
        let rest = full_id.strip_prefix('p')?;
        let (part, key) = rest.split_once('_')?;
        let part = part.parse::<usize>().ok()?.checked_sub(1)?;
        if part >= NUM_PARTS {
            return None;
        }
        Some((part, ParamId::from_key(key)?))
    }

    /// Set a value by fully qualified id. Returns false for unknown ids.
    pub fn set_by_id(&self, full_id: &str, value: f32) -> bool {
        match self.find(full_id) {
            Some((part, id)) => {
                self.parts[part].set(id, value);
                true
            }
            None => false,
        }
    }
}
