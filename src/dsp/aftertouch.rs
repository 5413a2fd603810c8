//! Pressure (aftertouch) handling for a drum part.
//!
//! Pressing harder on a pad does two things:
//!
//! - **Dampening**: the part's output is multiplied by
//!   `1 - pressure * sensitivity`, like a hand muting a cymbal.
//! - **Re-strike**: pushing pressure up through the retrigger threshold
//!   restarts the envelopes once. Pressure must fall back below the
//!   threshold before another re-strike can fire.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AftertouchConfig {
    pub dampen_sensitivity: f32,
    pub retrigger_threshold: f32,
}

impl Default for AftertouchConfig {
    fn default() -> Self {
        Self {
            dampen_sensitivity: 0.7,
            retrigger_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AftertouchProcessor {
    pub config: AftertouchConfig,
    current: f32,
    previous: f32,
    armed: bool,
}

impl Default for AftertouchProcessor {
    fn default() -> Self {
        Self::new(AftertouchConfig::default())
    }
}

impl AftertouchProcessor {
    pub fn new(config: AftertouchConfig) -> Self {
        Self {
            config,
            current: 0.0,
            previous: 0.0,
            armed: true,
        }
    }

    pub fn set_aftertouch(&mut self, pressure: f32) {
        self.previous = self.current;
        self.current = pressure;

        if self.current < self.config.retrigger_threshold {
            self.armed = true;
        }
    }

    pub fn pressure(&self) -> f32 {
        self.current
    }

    /// Output gain for the current pressure, clamped to [0, 1].
    pub fn dampen_multiplier(&self) -> f32 {
        (1.0 - self.current * self.config.dampen_sensitivity).clamp(0.0, 1.0)
    }

    /// True exactly once per upward crossing of the threshold.
    pub fn should_retrigger(&mut self) -> bool {
        let threshold = self.config.retrigger_threshold;
        if self.armed && self.current >= threshold && self.previous < threshold {
            self.armed = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_fires_once() {
        let mut at = AftertouchProcessor::default();
        at.set_aftertouch(0.1);
        assert!(!at.should_retrigger());
        at.set_aftertouch(0.5);
        assert!(at.should_retrigger());
        assert!(!at.should_retrigger());

        at.set_aftertouch(0.6);
        assert!(!at.should_retrigger(), "no new crossing without dropping below");
    }

    #[test]
    fn rearms_after_falling_below_threshold() {
        let mut at = AftertouchProcessor::default();
        at.set_aftertouch(0.1);
        at.set_aftertouch(0.5);
        assert!(at.should_retrigger());

        at.set_aftertouch(0.2);
        assert!(!at.should_retrigger());
        at.set_aftertouch(0.9);
        assert!(at.should_retrigger());
    }

    #[test]
    fn dampening_follows_pressure() {
        let mut at = AftertouchProcessor::default();
        assert_eq!(at.dampen_multiplier(), 1.0);

        at.set_aftertouch(0.5);
        assert!((at.dampen_multiplier() - 0.65).abs() < 1e-6);
    }

    #[test]
    fn dampening_never_inverts() {
        let mut at = AftertouchProcessor::new(AftertouchConfig {
            dampen_sensitivity: 2.0,
            retrigger_threshold: 0.3,
        });
        at.set_aftertouch(1.0);
        assert_eq!(at.dampen_multiplier(), 0.0);
    }
}
