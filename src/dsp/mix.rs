//! Summing, envelope routing and the pan law.

/*
Mixing a Drum Part
==================

A part has four sources and four envelopes. Each source chooses one
envelope, then everything is summed into a single mono signal:

    mono[i] = Σ source[s][i] × envelope[assign[s]][i]

The mono signal is panned into the stereo output and ADDED to whatever is
already there. The engine renders several parts into the same buffer, so
nothing here ever overwrites.


Vocabulary
----------

  summing       Combining signals by addition. Four full-scale sources can
                sum to ±4.0; the per-source level knobs and the part volume
                are where gain staging happens.

  pan           Position in the stereo field, -1.0 (left) to +1.0 (right).

  pan law       The rule mapping a pan position to a left and a right gain.


Linear vs Constant-Power Panning
--------------------------------

LINEAR:

    left  = (1 - pan) / 2
    right = (1 + pan) / 2

    At centre both gains are 0.5. Two speakers at half amplitude carry half
    the acoustic power of one at full, so a sound dips by ~3 dB as it passes
    through the middle.

CONSTANT-POWER (what we implement):

    left  = √(0.5 × (1 - pan))
    right = √(0.5 × (1 + pan))

    left² + right² = 1 for every pan position, so perceived loudness stays
    put while the sound moves.

              pan    left    right
             -1.0   1.000   0.000
              0.0   0.707   0.707
             +1.0   0.000   1.000
*/

/// Left and right gains for a pan position using the constant-power law.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    ((0.5 * (1.0 - pan)).sqrt(), (0.5 * (1.0 + pan)).sqrt())
}

/// Add `source × envelope` into `out`.
#[inline]
pub fn multiply_accumulate(out: &mut [f32], source: &[f32], envelope: &[f32]) {
    debug_assert_eq!(out.len(), source.len());
    debug_assert!(envelope.len() >= out.len());

    for ((o, &s), &e) in out.iter_mut().zip(source.iter()).zip(envelope.iter()) {
        *o += s * e;
    }
}

/// Add `signal × gain` into `out`.
#[inline]
pub fn accumulate_scaled(out: &mut [f32], signal: &[f32], gain: f32) {
    debug_assert_eq!(out.len(), signal.len());

    for (o, &s) in out.iter_mut().zip(signal.iter()) {
        *o += s * gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_centre_is_equal_power() {
        let (l, r) = pan_gains(0.0);
        assert!((l - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(l, r);
    }

    #[test]
    fn test_pan_extremes() {
        assert_eq!(pan_gains(-1.0), (1.0, 0.0));
        assert_eq!(pan_gains(1.0), (0.0, 1.0));
    }

    #[test]
    fn test_pan_power_is_constant() {
        for i in -10..=10 {
            let (l, r) = pan_gains(i as f32 / 10.0);
            assert!((l * l + r * r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_multiply_accumulate_adds() {
        let mut out = [1.0, 1.0, 1.0];
        multiply_accumulate(&mut out, &[1.0, 0.5, -1.0], &[0.5, 1.0, 1.0]);
        assert_eq!(out, [1.5, 1.5, 0.0]);
    }

    #[test]
    fn test_accumulate_scaled_never_overwrites() {
        let mut out = [0.25, -0.25];
        accumulate_scaled(&mut out, &[1.0, 1.0], 0.5);
        assert_eq!(out, [0.75, 0.25]);
    }
}
