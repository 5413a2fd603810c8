/*
Band-Limited Synth Oscillator
=============================

Each drum part has one pitched oscillator for the tonal body of the sound:
the boom of a kick, the ring of a tom, the "tok" under a snare.

Waveform Types and Their Character:
-----------------------------------

Sine:     Pure fundamental. Kick and sub-boom material.
Triangle: Odd harmonics falling off as 1/n². Soft, woody toms.
Saw:      Every harmonic, falling off as 1/n. Bright and buzzy.
Square:   Odd harmonics; with a variable pulse width the timbre moves
          from hollow (50%) to thin and nasal (5% or 95%).


Phase Accumulator
-----------------

Phase runs from 0.0 to 1.0 once per cycle:

    increment = frequency / sample_rate
    phase     = (phase + increment) mod 1.0

At 441 Hz and 44.1 kHz the increment is 0.01, so one cycle is 100 samples.


Why Saw and Square Need Help (Aliasing)
---------------------------------------

A naive saw jumps from +1 to -1 in zero time. That vertical edge contains
harmonics far above Nyquist, which fold back down as inharmonic whistles.
polyBLEP (polynomial band-limited step) rounds off the corner over the one
sample either side of the jump:

    t < dt        (just after the wrap)    t' = t / dt
                  correction = 2t' - t'² - 1
    t > 1 - dt    (just before the wrap)   t' = (t - 1) / dt
                  correction = t'² + 2t' + 1
    otherwise     correction = 0

The correction is subtracted from a saw (falling edge at the wrap) and added
to a square (rising edge at the wrap). A square also has a falling edge at
`phase == pulse_width`, so a second correction is evaluated at the phase
shifted by `1 - pulse_width` and subtracted.


Amplitude
---------

output = waveform(phase) * level * velocity

There is no release stage here. Whatever envelope the part assigns to the
synth source does all the amplitude shaping.
*/

use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

impl Waveform {
    /// Map a choice-parameter index to a waveform, saturating at `Square`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            2 => Waveform::Saw,
            _ => Waveform::Square,
        }
    }
}

pub struct SynthOscillator {
    pub waveform: Waveform,
    /// Semitone offset applied when the oscillator is triggered.
    pub tune: f32,
    pub pulse_width: f32,
    pub level: f32,

    sample_rate: f64,
    phase: f64,
    increment: f64,
    velocity: f32,
    playing: bool,
}

#[inline]
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

impl SynthOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            waveform: Waveform::Sine,
            tune: 0.0,
            pulse_width: 0.5,
            level: 1.0,
            sample_rate: f64::from(sample_rate),
            phase: 0.0,
            increment: 0.0,
            velocity: 0.0,
            playing: false,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = f64::from(sample_rate);
        self.phase = 0.0;
        self.playing = false;
    }

    /// Restart the cycle at phase 0 with a new pitch and velocity.
    pub fn trigger(&mut self, velocity: f32, frequency: f32) {
        let tuned = f64::from(frequency) * 2.0_f64.powf(f64::from(self.tune) / 12.0);
        self.increment = tuned / self.sample_rate;
        self.velocity = velocity;
        self.phase = 0.0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    fn waveform_at(&self, phase: f64) -> f64 {
        let dt = self.increment;
        match self.waveform {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => 2.0 * (2.0 * phase - 1.0).abs() - 1.0,
            Waveform::Saw => 2.0 * phase - 1.0 - poly_blep(phase, dt),
            Waveform::Square => {
                let width = f64::from(self.pulse_width);
                let naive = if phase < width { 1.0 } else { -1.0 };
                let mut falling = phase + (1.0 - width);
                if falling >= 1.0 {
                    falling -= 1.0;
                }
                naive + poly_blep(phase, dt) - poly_blep(falling, dt)
            }
        }
    }

    /// Overwrite `out` with oscillator output. Silence when not triggered.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.playing {
            out.fill(0.0);
            return;
        }

        let gain = self.level * self.velocity;
        for sample in out.iter_mut() {
            *sample = self.waveform_at(self.phase) as f32 * gain;

            self.phase += self.increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }
}
