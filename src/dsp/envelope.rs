/*
Drum Envelopes
==============

Linear ADSR generator. Each drum part carries four of these, and every
sound source is shaped by one of them.

Vocabulary
----------

  level       Current gain, 0.0 to 1.0, multiplied into a source sample
              by sample.

  stage       Idle, Attack, Decay, Sustain or Release.

  ramp        A straight line from `start_level` to `target_level` spread
              over `stage_length` samples. Attack, Decay and Release are ramps.

  elapsed     Samples spent in the current ramp so far.


Ramps, Not Curves
-----------------

  gain
    1 ─┤    /\
       │   /  \________
    S ─┤  /            \
       │ /              \
    0 ─┼/────────────────\────▶ samples
        |A | D |  S     | R |

Every ramp is computed by interpolation rather than accumulation:

    level = start + (target - start) * elapsed / length

so a ramp of N samples always takes exactly N samples, independent of
floating point drift, and the level can never overshoot its endpoints.
A stage time converts to N by rounding to the nearest whole sample, with
a minimum of one.


Retriggering Without Clicks
---------------------------

Drums get hit again while they are still ringing. A hard reset to 0.0 on
every hit would produce a discontinuity (an audible click). Instead a
trigger restarts the Attack ramp from wherever the level currently is:

    1.0 ┐   ╱╲      ╱╲
        │  ╱  ╲    ╱  ╲
        │ ╱    ╲__╱    ╲___
    0.0 └╱─────────────────→
             hit again ↑ (ramp starts at the current level)

Release does the same: it snapshots the current level and ramps to zero
from there, whichever stage it interrupts.


The State Machine
-----------------

    trigger() ──→ Attack ──(length reached)──→ Decay ──→ Sustain
       ↑  any stage   │                          │          │
       │              └──────── release() ───────┴──────────┤
       │                                                    ↓
     Idle ←────────────────(length reached)──────────── Release

Stage changes happen the instant `elapsed` reaches `stage_length`, so a
single `render` call may cross several stages.

Attack, Decay and Release take their length and endpoints when the stage
is entered; editing a time knob mid-ramp only affects the next ramp.
Sustain is different: it re-reads `params.sustain` on every sample so the
held level follows the knob live. The sustain level is clamped to [0, 1]
and a NaN sustain holds at 0.0.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The current stage of the envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // Inactive, level = 0
    Attack,  // Ramping from the current level up to 1.0
    Decay,   // Ramping from 1.0 down to the sustain level
    Sustain, // Holding the (live) sustain level
    Release, // Ramping from the current level down to 0
}

/// Envelope times in seconds and the sustain level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.5,
            release: 0.4,
        }
    }
}

pub struct Envelope {
    /// Shape parameters; the owning voice refreshes these once per block.
    pub params: AdsrParams,
    sample_rate: f32,

    stage: EnvelopeStage,
    level: f32,

    // Ramp bookkeeping, fixed when a stage is entered
    start_level: f32,
    target_level: f32,
    elapsed: u32,
    stage_length: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(sample_rate, AdsrParams::default())
    }

    pub fn with_params(sample_rate: f32, params: AdsrParams) -> Self {
        Self {
            params,
            sample_rate,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            start_level: 0.0,
            target_level: 0.0,
            elapsed: 0,
            stage_length: 0,
        }
    }

    /// Set the sample rate and return to idle.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    /// Start the attack ramp from the current level, whatever the stage.
    pub fn trigger(&mut self) {
        self.begin_ramp(EnvelopeStage::Attack, 1.0, self.params.attack);
    }

    /// Re-strike used by aftertouch.
    ///
    /// `intensity` is accepted for API stability but currently has no effect:
    /// the transition is exactly the one `trigger` performs.
    pub fn retrigger_partial(&mut self, _intensity: f32) {
        self.trigger();
    }

    /// Start the release ramp from the current level. Idle envelopes stay idle.
    pub fn release(&mut self) {
        self.force_release(self.params.release);
    }

    /// Release over a caller-supplied time instead of `params.release`.
    pub fn force_release(&mut self, time: f32) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        self.begin_ramp(EnvelopeStage::Release, 0.0, time);
    }

    fn begin_ramp(&mut self, stage: EnvelopeStage, target: f32, seconds: f32) {
        self.stage = stage;
        self.start_level = self.level;
        self.target_level = target;
        self.elapsed = 0;
        self.stage_length = self.seconds_to_samples(seconds);
    }

    #[inline]
    fn seconds_to_samples(&self, seconds: f32) -> u32 {
        (seconds.max(0.0) * self.sample_rate).round().max(1.0) as u32
    }

    #[inline]
    fn sustain_level(&self) -> f32 {
        if self.params.sustain.is_nan() {
            0.0
        } else {
            self.params.sustain.clamp(0.0, 1.0)
        }
    }

    fn advance_stage(&mut self) {
        match self.stage {
            EnvelopeStage::Attack => {
                self.stage = EnvelopeStage::Decay;
                self.start_level = 1.0;
                self.target_level = self.sustain_level();
                self.elapsed = 0;
                self.stage_length = self.seconds_to_samples(self.params.decay);
            }
            EnvelopeStage::Decay => {
                self.stage = EnvelopeStage::Sustain;
                self.level = self.sustain_level();
                self.start_level = self.level;
                self.target_level = self.level;
                self.elapsed = 0;
                self.stage_length = 0;
            }
            EnvelopeStage::Release => {
                self.stage = EnvelopeStage::Idle;
                self.level = 0.0;
            }
            EnvelopeStage::Idle | EnvelopeStage::Sustain => {}
        }
    }

    /// Produce one sample of envelope output and advance the state machine.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => 0.0,
            EnvelopeStage::Sustain => {
                self.level = self.sustain_level();
                self.level
            }
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Release => {
                let progress = self.elapsed as f32 / self.stage_length as f32;
                self.level = self.start_level + (self.target_level - self.start_level) * progress;

                debug_assert!(
                    self.level >= self.start_level.min(self.target_level) - 1e-6
                        && self.level <= self.start_level.max(self.target_level) + 1e-6
                );

                let out = self.level;
                self.elapsed += 1;
                if self.elapsed >= self.stage_length {
                    self.advance_stage();
                }
                out
            }
        }
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.start_level = 0.0;
        self.target_level = 0.0;
        self.elapsed = 0;
        self.stage_length = 0;
    }

    /// Get the current envelope level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
