//! The four-part drum engine and its control-side handle.
//!
//! `DrumEngine::new` returns two halves. The engine moves into the audio
//! callback and is driven by `process_block`; the [`EngineHandle`] stays on
//! the control thread for pad triggers, parameter edits and sample loads.
//! The two halves share only lock-free state: the parameter store, the
//! sample slots and the trigger ring.

use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::sampler::SampleSlot,
    error::LoadError,
    io::{AudioOutput, SampleDecoder},
    params::{KitParams, ParamId, PartSnapshot},
    synth::{
        message::{DrumEvent, MessageReceiver},
        trigger_queue::{trigger_queue, TriggerReceiver, TriggerSender},
        voice::DrumVoice,
    },
    DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE, NUM_PARTS,
};

const NOISE_SEED: u64 = 0x5EED_D2A1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Largest block rendered in one pass; longer outputs are chunked.
    pub max_block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: MAX_BLOCK_SIZE,
        }
    }
}

pub struct DrumEngine {
    config: EngineConfig,
    voices: [DrumVoice; NUM_PARTS],
    params: Arc<KitParams>,
    triggers: TriggerReceiver,
}

/// Control-thread side of the engine.
pub struct EngineHandle {
    config: EngineConfig,
    params: Arc<KitParams>,
    slots: [[Arc<SampleSlot>; 2]; NUM_PARTS],
    triggers: TriggerSender,
}

impl DrumEngine {
    pub fn new(config: EngineConfig) -> (Self, EngineHandle) {
        let config = EngineConfig {
            max_block_size: config.max_block_size.max(1),
            ..config
        };
        let params = Arc::new(KitParams::new());
        let slots: [[Arc<SampleSlot>; 2]; NUM_PARTS] =
            std::array::from_fn(|_| [Arc::new(SampleSlot::new()), Arc::new(SampleSlot::new())]);
        let (tx, rx) = trigger_queue();

        let voices = std::array::from_fn(|part| {
            DrumVoice::new(
                config.sample_rate,
                config.max_block_size,
                slots[part].clone(),
                NOISE_SEED + part as u64,
            )
        });

        log::debug!(
            "drum engine ready: {} Hz, max block {}",
            config.sample_rate,
            config.max_block_size
        );

        let engine = Self {
            config,
            voices,
            params: Arc::clone(&params),
            triggers: rx,
        };
        let handle = EngineHandle {
            config,
            params,
            slots,
            triggers: tx,
        };
        (engine, handle)
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Re-initialise every voice for a new rate or block size.
    ///
    /// Allocates, so call it before the stream starts rather than from the
    /// audio callback.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.config = EngineConfig {
            sample_rate,
            max_block_size: max_block_size.max(1),
        };
        for voice in &mut self.voices {
            voice.prepare(sample_rate, self.config.max_block_size);
        }
    }

    pub fn is_part_active(&self, part: usize) -> bool {
        self.voices.get(part).is_some_and(DrumVoice::is_active)
    }

    fn snapshot_parts(&self) -> [PartSnapshot; NUM_PARTS] {
        std::array::from_fn(|part| self.params.part(part).snapshot())
    }

    fn drain_triggers(&mut self, snapshots: &[PartSnapshot; NUM_PARTS]) {
        let voices = &mut self.voices;
        self.triggers.drain(|request| {
            if let Some(voice) = voices.get_mut(request.part) {
                voice.trigger(request.velocity, &snapshots[request.part]);
            }
        });
    }

    fn handle_event(&mut self, event: DrumEvent, snapshots: &[PartSnapshot; NUM_PARTS]) {
        let Some(part) = event.target_part() else {
            return;
        };
        let voice = &mut self.voices[part];
        let params = &snapshots[part];

        match event {
            DrumEvent::NoteOn { velocity, .. } => voice.trigger(velocity, params),
            DrumEvent::NoteOff { .. } => voice.release(),
            DrumEvent::ChannelPressure { pressure, .. }
            | DrumEvent::PolyAftertouch { pressure, .. } => voice.apply_aftertouch(pressure, params),
        }
    }

    fn render(&mut self, output: &mut AudioOutput, snapshots: &[PartSnapshot; NUM_PARTS]) {
        let any_solo = snapshots.iter().any(|s| s.solo);
        let frames = output.num_frames();
        let chunk = self.config.max_block_size;

        let mut offset = 0;
        while offset < frames {
            let len = chunk.min(frames - offset);
            for (voice, params) in self.voices.iter_mut().zip(snapshots) {
                if params.mute || (any_solo && !params.solo) {
                    continue;
                }
                voice.process_block(output, offset, len, params);
            }
            offset += len;
        }
    }

    /// Render one block.
    ///
    /// Queued pad triggers are replayed first, then `events` in order, then
    /// every audible part is added into `output`. The caller clears `output`.
    pub fn process_block(&mut self, output: &mut AudioOutput, events: &[DrumEvent]) {
        let snapshots = self.snapshot_parts();
        self.drain_triggers(&snapshots);
        for &event in events {
            self.handle_event(event, &snapshots);
        }
        self.render(output, &snapshots);
    }

    /// Like [`DrumEngine::process_block`], pulling events from a receiver.
    pub fn process_from<R: MessageReceiver>(&mut self, output: &mut AudioOutput, rx: &mut R) {
        let snapshots = self.snapshot_parts();
        self.drain_triggers(&snapshots);
        while let Some(event) = rx.pop() {
            self.handle_event(event, &snapshots);
        }
        self.render(output, &snapshots);
    }
}

impl EngineHandle {
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Queue a pad hit for the next block. False if dropped.
    pub fn trigger(&mut self, part: usize, velocity: f32) -> bool {
        let queued = self.triggers.enqueue(part, velocity);
        if !queued {
            log::debug!("trigger for part {part} dropped");
        }
        queued
    }

    pub fn params(&self) -> &Arc<KitParams> {
        &self.params
    }

    /// Set one parameter. Values are clamped; unknown parts and invalid ids
    /// are ignored.
    pub fn set_param(&self, part: usize, id: ParamId, value: f32) {
        if part < NUM_PARTS && id.is_valid() {
            self.params.part(part).set(id, value);
        }
    }

    pub fn param(&self, part: usize, id: ParamId) -> Option<f32> {
        (part < NUM_PARTS && id.is_valid()).then(|| self.params.part(part).get(id))
    }

    pub fn sample_slot(&self, part: usize, slot: usize) -> Option<&Arc<SampleSlot>> {
        self.slots.get(part)?.get(slot)
    }

    /// Decode a file into a part's sample slot, replacing what was there.
    pub fn load_sample(
        &self,
        part: usize,
        slot: usize,
        path: &Path,
        decoder: &dyn SampleDecoder,
    ) -> Result<(), LoadError> {
        let target = self
            .sample_slot(part, slot)
            .ok_or(LoadError::NoSuchSlot { part, slot })?;
        target.load(path, decoder)
    }

    /// Best-effort load: empty paths and failures leave the slot as it was.
    pub fn load_from_path(&self, part: usize, slot: usize, path: &Path, decoder: &dyn SampleDecoder) {
        match self.sample_slot(part, slot) {
            Some(target) => target.load_from_path(path, decoder),
            None => log::warn!("no sample slot {slot} on part {part}"),
        }
    }

    pub fn clear_sample(&self, part: usize, slot: usize) {
        if let Some(target) = self.sample_slot(part, slot) {
            target.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dsp::sampler::SampleData, io::DecodedAudio, params::AdsrField, NUM_ENVELOPES};

    const SAMPLE_RATE: f32 = 1_000.0;
    const BLOCK: usize = 32;

    fn engine() -> (DrumEngine, EngineHandle) {
        DrumEngine::new(EngineConfig {
            sample_rate: SAMPLE_RATE,
            max_block_size: BLOCK,
        })
    }

    fn energy(out: &AudioOutput) -> f32 {
        out.buffers.iter().flatten().map(|s| s * s).sum()
    }

    fn note_on(channel: u8, note: u8) -> DrumEvent {
        DrumEvent::NoteOn {
            channel,
            note,
            velocity: 1.0,
        }
    }

    #[test]
    fn silent_until_triggered() {
        let (mut engine, _handle) = engine();
        let mut out = AudioOutput::stereo(BLOCK);
        engine.process_block(&mut out, &[]);
        assert_eq!(energy(&out), 0.0);
    }

    #[test]
    fn channel_and_drum_map_routing() {
        let (mut engine, _handle) = engine();
        let mut out = AudioOutput::stereo(BLOCK);

        engine.process_block(&mut out, &[note_on(2, 60), note_on(10, 46), note_on(10, 40), note_on(7, 36)]);
        let active: Vec<_> = (0..NUM_PARTS).map(|p| engine.is_part_active(p)).collect();
        assert_eq!(active, vec![false, true, false, true]);
    }

    #[test]
    fn queued_triggers_play_at_block_start() {
        let (mut engine, mut handle) = engine();
        assert!(handle.trigger(2, 0.8));
        assert!(!handle.trigger(9, 0.8));

        let mut out = AudioOutput::stereo(BLOCK);
        engine.process_block(&mut out, &[]);
        assert!(engine.is_part_active(2));
        assert!(energy(&out) > 0.0);
    }

    #[test]
    fn mute_and_solo_gate_parts() {
        let (mut engine, handle) = engine();
        let mut out = AudioOutput::stereo(BLOCK);

        handle.set_param(0, ParamId::Mute, 1.0);
        engine.process_block(&mut out, &[note_on(1, 0)]);
        assert_eq!(energy(&out), 0.0);

        handle.set_param(0, ParamId::Mute, 0.0);
        handle.set_param(1, ParamId::Solo, 1.0);
        out.clear();
        engine.process_block(&mut out, &[note_on(1, 0)]);
        assert_eq!(energy(&out), 0.0);

        handle.set_param(0, ParamId::Solo, 1.0);
        out.clear();
        engine.process_block(&mut out, &[]);
        assert!(energy(&out) > 0.0);
    }

    #[test]
    fn pressure_on_drum_channel_is_ignored() {
        let (mut engine, handle) = engine();
        handle.set_param(0, ParamId::AftertouchDampen, 1.0);
        let mut out = AudioOutput::mono(BLOCK);
        engine.process_block(&mut out, &[note_on(1, 0)]);

        let pressure = DrumEvent::ChannelPressure {
            channel: 10,
            pressure: 1.0,
        };
        out.clear();
        engine.process_block(&mut out, &[pressure]);
        assert!(energy(&out) > 0.0);

        let pressure = DrumEvent::ChannelPressure {
            channel: 1,
            pressure: 1.0,
        };
        out.clear();
        engine.process_block(&mut out, &[pressure]);
        assert_eq!(energy(&out), 0.0, "full dampening silences the part");
    }

    #[test]
    fn invalid_param_ids_are_ignored() {
        let (_engine, handle) = engine();
        let env5 = ParamId::Envelope {
            index: 5,
            field: AdsrField::Attack,
        };

        handle.set_param(0, ParamId::SampleLevel(2), 3.0);
        handle.set_param(0, env5, 0.5);

        assert_eq!(handle.param(0, ParamId::SynthWave), Some(0.0));
        assert_eq!(handle.param(0, ParamId::SampleLevel(2)), None);
        assert_eq!(handle.param(0, env5), None);
        assert_eq!(handle.param(4, ParamId::Volume), None);
    }

    #[test]
    fn nan_sustain_written_raw_still_renders() {
        let (mut engine, handle) = engine();
        for index in 0..NUM_ENVELOPES {
            let sustain = ParamId::Envelope {
                index,
                field: AdsrField::Sustain,
            };
            handle.params().part(0).set_raw(sustain, f32::NAN);
        }

        let mut out = AudioOutput::stereo(BLOCK);
        engine.process_block(&mut out, &[note_on(1, 0)]);
        for _ in 0..20 {
            engine.process_block(&mut out, &[]);
        }
        assert!(engine.is_part_active(0));
        assert!(out.buffers.iter().flatten().all(|s| s.is_finite()));
    }

    #[test]
    fn long_outputs_are_chunked() {
        let (mut engine, _handle) = engine();
        let mut out = AudioOutput::stereo(BLOCK * 3 + 5);
        engine.process_block(&mut out, &[note_on(1, 0)]);

        let tail = &out.buffers[0][BLOCK * 3..];
        assert!(tail.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn receiver_events_are_consumed() {
        let (mut engine, _handle) = engine();
        let (mut tx, mut rx) = rtrb::RingBuffer::new(8);
        tx.push(note_on(10, 38)).unwrap();

        let mut out = AudioOutput::stereo(BLOCK);
        engine.process_from(&mut out, &mut rx);
        assert!(engine.is_part_active(1));
    }

    struct DcDecoder;

    impl SampleDecoder for DcDecoder {
        fn decode(&self, _path: &Path) -> Result<DecodedAudio, LoadError> {
            Ok(DecodedAudio {
                channels: vec![vec![1.0; 100]],
                sample_rate: 1_000,
            })
        }
    }

    #[test]
    fn sample_loading_through_the_handle() {
        let (_engine, handle) = engine();
        handle.load_sample(1, 0, Path::new("snare.wav"), &DcDecoder).unwrap();
        assert_eq!(
            handle.sample_slot(1, 0).and_then(|s| s.file_name()).as_deref(),
            Some("snare.wav")
        );

        let err = handle.load_sample(4, 0, Path::new("x.wav"), &DcDecoder).unwrap_err();
        assert!(matches!(err, LoadError::NoSuchSlot { part: 4, slot: 0 }));

        handle.clear_sample(1, 0);
        assert!(!handle.sample_slot(1, 0).is_some_and(|s| s.is_loaded()));
    }

    #[test]
    fn loaded_sample_is_heard() {
        let (mut engine, handle) = engine();
        for part in 0..NUM_PARTS {
            handle.set_param(part, ParamId::SynthLevel, 0.0);
            handle.set_param(part, ParamId::NoiseLevel, 0.0);
        }
        let mut out = AudioOutput::mono(BLOCK);
        engine.process_block(&mut out, &[note_on(1, 0)]);
        assert_eq!(energy(&out), 0.0);

        if let Some(slot) = handle.sample_slot(0, 1) {
            slot.store(SampleData::new(vec![1.0; 500], SAMPLE_RATE, "dc"));
        }
        out.clear();
        engine.process_block(&mut out, &[note_on(1, 0)]);
        assert!(energy(&out) > 0.0);
    }
}
