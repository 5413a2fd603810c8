/*
Noise Sources
=============

Snare wires, hi-hats, claps and the "air" on top of a kick are all noise.
Three flavours are available, each followed by the same tone filter.

WHITE
    Uniform random samples in [-1, 1]. Equal energy per Hz, so it sounds
    bright and hissy.

PINK
    Equal energy per octave (-3 dB/octave). Darker and fuller than white.
    Built with Paul Kellet's "refined" method: seven one-pole filters with
    fixed coefficients run in parallel over white noise and are summed.

        b0 = 0.99886 b0 + w * 0.0555179
        b1 = 0.99332 b1 + w * 0.0750759
        b2 = 0.96900 b2 + w * 0.1538520
        b3 = 0.86650 b3 + w * 0.3104856
        b4 = 0.55000 b4 + w * 0.5329522
        b5 = -0.7616 b5 - w * 0.0168980
        pink = b0 + b1 + b2 + b3 + b4 + b5 + b6 + w * 0.5362
        b6 = w * 0.115926

    The sum peaks around ±9, so it is scaled by 0.11.

METALLIC
    A short circular delay line with heavy feedback (0.95). White noise is
    fed in, the delayed signal is averaged with its neighbour one sample
    older and written back. The loop resonates at sample_rate / length,
    and because noise keeps exciting it the result is an inharmonic, bell
    or cymbal-like ring. `tone` sets the loop length:

        length = clamp(tone * 250 + 6, 4, 256) samples


Tone Filter
-----------

Every type ends in a one-pole lowpass:

    state += coeff * (input - state)      coeff = clamp(cutoff, 0, 1)²

The squared mapping puts more of the knob's travel in the dark region,
where the ear is more sensitive. cutoff = 1 passes the noise unchanged.
*/

use oorandom::Rand32;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const METAL_BUFFER_LEN: usize = 256;
const METAL_FEEDBACK: f32 = 0.95;
const PINK_SCALE: f32 = 0.11;
/// Below this level the generator skips synthesis entirely.
const SILENCE_LEVEL: f32 = 0.0001;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseType {
    #[default]
    White,
    Pink,
    Metallic,
}

impl NoiseType {
    /// Map a choice-parameter index to a noise type, saturating at `Metallic`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => NoiseType::White,
            1 => NoiseType::Pink,
            _ => NoiseType::Metallic,
        }
    }
}

pub struct NoiseGenerator {
    pub noise_type: NoiseType,
    pub level: f32,
    /// Tone filter position, 0 = very dark, 1 = unfiltered.
    pub filter_cutoff: f32,
    /// Resonance pitch of the metallic delay loop.
    pub tone: f32,

    rng: Rand32,
    pink: [f32; 7],
    metal: [f32; METAL_BUFFER_LEN],
    metal_write: usize,
    filter_state: f32,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            noise_type: NoiseType::White,
            level: 1.0,
            filter_cutoff: 1.0,
            tone: 0.5,
            rng: Rand32::new(seed),
            pink: [0.0; 7],
            metal: [0.0; METAL_BUFFER_LEN],
            metal_write: 0,
            filter_state: 0.0,
        }
    }

    /// Clear all filter and delay memory.
    pub fn reset(&mut self) {
        self.pink = [0.0; 7];
        self.metal = [0.0; METAL_BUFFER_LEN];
        self.metal_write = 0;
        self.filter_state = 0.0;
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.rng.rand_float() * 2.0 - 1.0
    }

    #[inline]
    fn pink(&mut self, white: f32) -> f32 {
        let b = &mut self.pink;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let sum = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115_926;
        sum * PINK_SCALE
    }

    #[inline]
    fn metallic(&mut self, white: f32) -> f32 {
        let delay = metal_delay_length(self.tone);
        let read = (self.metal_write + METAL_BUFFER_LEN - delay) % METAL_BUFFER_LEN;
        let read_prev = (read + METAL_BUFFER_LEN - 1) % METAL_BUFFER_LEN;

        let excited = white * 0.3 + self.metal[read] * METAL_FEEDBACK;
        let sample = (excited + self.metal[read_prev]) * 0.5;

        self.metal[self.metal_write] = sample;
        self.metal_write = (self.metal_write + 1) % METAL_BUFFER_LEN;
        sample
    }

    /// Overwrite `out` with filtered noise.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.level <= SILENCE_LEVEL {
            out.fill(0.0);
            return;
        }

        let cutoff = self.filter_cutoff.clamp(0.0, 1.0);
        let coeff = cutoff * cutoff;

        for sample in out.iter_mut() {
            let white = self.white();
            let raw = match self.noise_type {
                NoiseType::White => white,
                NoiseType::Pink => self.pink(white),
                NoiseType::Metallic => self.metallic(white),
            };

            self.filter_state += coeff * (raw - self.filter_state);
            *sample = self.filter_state * self.level;
        }
    }
}

/// Delay-loop length in samples for a tone setting.
pub fn metal_delay_length(tone: f32) -> usize {
    ((tone * 250.0 + 6.0) as i32).clamp(4, METAL_BUFFER_LEN as i32) as usize
}
