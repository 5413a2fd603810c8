/*
Drum Voice
==========

One voice per part. Four sources are rendered side by side, each shaped by
whichever envelope it is assigned to, summed to mono and panned into the
caller's buffer.

    Sample 1 ──┐
    Sample 2 ──┤   × env[assign[source]]
    Synth    ──┼──────────────────────────▶ Σ ──▶ pan ──▶ += out L/R
    Noise    ──┘
                      EnvelopeBank (4)

Vocabulary
----------

  - Assignment: per-source index 0..3 choosing which envelope stream shapes
    it. Several sources may share one envelope.
  - Dampen: the aftertouch gain, 1 with no pressure, falling as the pad is
    pressed harder.

Lifecycle
---------

The voice is "active" while any of its envelopes is. Sources keep running
after the envelopes go idle but are never rendered: an idle voice costs
nothing and adds nothing to the output.

Only the envelopes respond to note-off. Samples play to their end and the
oscillator free-runs; the envelope decides what is heard.

Gains
-----

    left  = volume × dampen × sqrt(0.5 × (1 − pan))
    right = volume × dampen × sqrt(0.5 × (1 + pan))

With a single output channel only the left gain is used.
*/

use std::sync::Arc;

use crate::{
    dsp::{
        aftertouch::AftertouchProcessor,
        envelope_bank::EnvelopeBank,
        mix::{accumulate_scaled, multiply_accumulate, pan_gains},
        noise::NoiseGenerator,
        oscillator::SynthOscillator,
        sampler::{SamplePlayer, SampleSlot},
    },
    io::AudioOutput,
    params::PartSnapshot,
    NUM_SOURCES,
};

pub use crate::params::SourceKind;

pub struct DrumVoice {
    samples: [SamplePlayer; 2],
    synth: SynthOscillator,
    noise: NoiseGenerator,
    envelopes: EnvelopeBank,
    aftertouch: AftertouchProcessor,
    env_assign: [usize; NUM_SOURCES],
    volume: f32,
    pan: f32,

    // Scratch, sized to the max block
    source_buffers: [Vec<f32>; NUM_SOURCES],
    mix_buffer: Vec<f32>,
}

impl DrumVoice {
    pub fn new(
        sample_rate: f32,
        max_block_size: usize,
        slots: [Arc<SampleSlot>; 2],
        noise_seed: u64,
    ) -> Self {
        let [slot1, slot2] = slots;
        Self {
            samples: [
                SamplePlayer::new(sample_rate, slot1),
                SamplePlayer::new(sample_rate, slot2),
            ],
            synth: SynthOscillator::new(sample_rate),
            noise: NoiseGenerator::new(noise_seed),
            envelopes: EnvelopeBank::new(sample_rate, max_block_size),
            aftertouch: AftertouchProcessor::default(),
            env_assign: [0; NUM_SOURCES],
            volume: 1.0,
            pan: 0.0,
            source_buffers: std::array::from_fn(|_| vec![0.0; max_block_size]),
            mix_buffer: vec![0.0; max_block_size],
        }
    }

    /// Reset all state for a new sample rate or block size. Allocates.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        for player in &mut self.samples {
            player.prepare(sample_rate);
        }
        self.synth.prepare(sample_rate);
        self.noise.reset();
        self.envelopes.prepare(sample_rate, max_block_size);
        for buf in self.source_buffers.iter_mut().chain(std::iter::once(&mut self.mix_buffer)) {
            buf.clear();
            buf.resize(max_block_size, 0.0);
        }
    }

    fn apply_params(&mut self, params: &PartSnapshot) {
        for (player, settings) in self.samples.iter_mut().zip(&params.samples) {
            player.level = settings.level;
            player.tune = settings.tune;
            player.start = settings.start;
        }

        self.synth.waveform = params.synth.waveform;
        self.synth.level = params.synth.level;
        self.synth.tune = params.synth.tune;
        self.synth.pulse_width = params.synth.pulse_width;

        self.noise.noise_type = params.noise.noise_type;
        self.noise.level = params.noise.level;
        self.noise.filter_cutoff = params.noise.filter_cutoff;
        self.noise.tone = params.noise.tone;

        self.aftertouch.config = params.aftertouch;
        self.envelopes.set_params(&params.envelopes);
        self.env_assign = params.env_assign;
        self.volume = params.volume;
        self.pan = params.pan;
    }

    /// Strike the part: restart every source and every envelope.
    pub fn trigger(&mut self, velocity: f32, params: &PartSnapshot) {
        self.apply_params(params);

        for player in &mut self.samples {
            player.trigger(velocity);
        }
        self.synth.trigger(velocity, params.synth_frequency());
        self.envelopes.trigger_all();
    }

    pub fn release(&mut self) {
        self.envelopes.release_all();
    }

    /// Feed a new pressure value. A re-strike restarts the envelopes only.
    pub fn apply_aftertouch(&mut self, pressure: f32, params: &PartSnapshot) {
        self.aftertouch.config = params.aftertouch;
        self.aftertouch.set_aftertouch(pressure);

        if self.aftertouch.should_retrigger() {
            self.envelopes.retrigger_partial_all(pressure);
        }
    }

    pub fn is_active(&self) -> bool {
        self.envelopes.is_any_active()
    }

    pub fn envelopes(&self) -> &EnvelopeBank {
        &self.envelopes
    }

    pub fn dampen_multiplier(&self) -> f32 {
        self.aftertouch.dampen_multiplier()
    }

    /// Render `len` frames and add them into `output` starting at `offset`.
    ///
    /// `len` must not exceed the max block size given at construction.
    pub fn process_block(
        &mut self,
        output: &mut AudioOutput,
        offset: usize,
        len: usize,
        params: &PartSnapshot,
    ) {
        if !self.is_active() || output.num_channels() == 0 {
            return;
        }
        debug_assert!(len <= self.mix_buffer.len());

        self.apply_params(params);
        self.envelopes.render(len);

        let [s1, s2, syn, nse] = &mut self.source_buffers;
        self.samples[0].render(&mut s1[..len]);
        self.samples[1].render(&mut s2[..len]);
        self.synth.render(&mut syn[..len]);
        self.noise.render(&mut nse[..len]);

        let mix = &mut self.mix_buffer[..len];
        mix.fill(0.0);
        for source in SourceKind::ALL {
            let i = source.index();
            let envelope = self.envelopes.output(self.env_assign[i]);
            multiply_accumulate(mix, &self.source_buffers[i][..len], &envelope[..len]);
        }

        let gain = self.volume * self.aftertouch.dampen_multiplier();
        let (left, right) = pan_gains(self.pan);
        let mut channels = output.buffers.iter_mut();
        if let Some(out) = channels.next() {
            accumulate_scaled(&mut out[offset..offset + len], mix, gain * left);
        }
        if let Some(out) = channels.next() {
            accumulate_scaled(&mut out[offset..offset + len], mix, gain * right);
        }
    }
}
