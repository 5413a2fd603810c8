//! A fixed bank of envelopes that render side by side.
//!
//! Each drum part owns one bank. Sources pick which of the four output
//! streams shapes them, so one envelope can drive several sources.

use crate::{
    dsp::envelope::{AdsrParams, Envelope},
    NUM_ENVELOPES,
};

pub struct EnvelopeBank {
    envelopes: [Envelope; NUM_ENVELOPES],
    outputs: [Vec<f32>; NUM_ENVELOPES],
}

impl EnvelopeBank {
    pub fn new(sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            envelopes: std::array::from_fn(|_| Envelope::new(sample_rate)),
            outputs: std::array::from_fn(|_| vec![0.0; max_block_size]),
        }
    }

    /// Reset every envelope and resize the output streams.
    ///
    /// Allocates; call from the control side only.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        for env in &mut self.envelopes {
            env.prepare(sample_rate);
        }
        for buf in &mut self.outputs {
            buf.clear();
            buf.resize(max_block_size, 0.0);
        }
    }

    pub fn trigger_all(&mut self) {
        for env in &mut self.envelopes {
            env.trigger();
        }
    }

    pub fn release_all(&mut self) {
        for env in &mut self.envelopes {
            env.release();
        }
    }

    pub fn retrigger_partial_all(&mut self, intensity: f32) {
        for env in &mut self.envelopes {
            env.retrigger_partial(intensity);
        }
    }

    /// Copy fresh shape parameters into every envelope.
    pub fn set_params(&mut self, params: &[AdsrParams; NUM_ENVELOPES]) {
        for (env, p) in self.envelopes.iter_mut().zip(params) {
            env.params = *p;
        }
    }

    /// Render `num_samples` of every envelope into its output stream.
    pub fn render(&mut self, num_samples: usize) {
        debug_assert!(num_samples <= self.max_block_size());
        for (env, buf) in self.envelopes.iter_mut().zip(self.outputs.iter_mut()) {
            env.render(&mut buf[..num_samples]);
        }
    }

    /// The most recently rendered stream of envelope `index`.
    pub fn output(&self, index: usize) -> &[f32] {
        &self.outputs[index]
    }

    pub fn envelope(&self, index: usize) -> &Envelope {
        &self.envelopes[index]
    }

    pub fn envelope_mut(&mut self, index: usize) -> &mut Envelope {
        &mut self.envelopes[index]
    }

    pub fn is_any_active(&self) -> bool {
        self.envelopes.iter().any(Envelope::is_active)
    }

    pub fn max_block_size(&self) -> usize {
        self.outputs[0].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeStage;

    #[test]
    fn bank_starts_idle() {
        let bank = EnvelopeBank::new(1_000.0, 64);
        assert!(!bank.is_any_active());
    }

    #[test]
    fn trigger_and_release_fan_out() {
        let mut bank = EnvelopeBank::new(1_000.0, 64);
        bank.trigger_all();
        for i in 0..NUM_ENVELOPES {
            assert_eq!(bank.envelope(i).stage(), EnvelopeStage::Attack);
        }

        bank.render(64);
        bank.release_all();
        for i in 0..NUM_ENVELOPES {
            assert_eq!(bank.envelope(i).stage(), EnvelopeStage::Release);
        }
    }

    #[test]
    fn any_active_while_one_envelope_rings() {
        let mut bank = EnvelopeBank::new(1_000.0, 64);
        let mut params = [AdsrParams {
            attack: 0.001,
            decay: 0.01,
            sustain: 0.5,
            release: 0.01,
        }; NUM_ENVELOPES];
        params[3].release = 1.0;
        bank.set_params(&params);

        bank.trigger_all();
        bank.render(32);
        bank.release_all();
        bank.render(32);

        assert!(!bank.envelope(0).is_active());
        assert!(bank.envelope(3).is_active());
        assert!(bank.is_any_active());
    }

    #[test]
    fn outputs_are_independent_streams() {
        let mut bank = EnvelopeBank::new(1_000.0, 16);
        let mut params = [AdsrParams::default(); NUM_ENVELOPES];
        params[1].attack = 0.002;
        bank.set_params(&params);

        bank.envelope_mut(1).trigger();
        bank.render(4);

        assert!(bank.output(0)[..4].iter().all(|&s| s == 0.0));
        assert_eq!(&bank.output(1)[..3], &[0.0, 0.5, 1.0]);
    }
}
