//! Step sequencer - a looping 16-step drum grid
//!
//! Runs in the audio callback. Each block it emits the drum events that are
//! due, so timing is block-accurate, which is all the engine honours anyway.

use pulse_dsp::{synth::message::DRUM_CHANNEL, DrumEvent, GM_NOTE_MAP, NUM_PARTS};

pub const STEPS: usize = 16;

/// Velocity per step per part. Zero is a rest.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    lanes: [[f32; STEPS]; NUM_PARTS],
}

impl Pattern {
    /// One string per part: `X` accent, `x` hit, anything else a rest.
    pub fn parse(lanes: [&str; NUM_PARTS]) -> Self {
        let lanes = lanes.map(|lane| {
            let mut steps = [0.0; STEPS];
            for (step, c) in steps.iter_mut().zip(lane.chars()) {
                *step = match c {
                    'X' => 1.0,
                    'x' => 0.6,
                    _ => 0.0,
                };
            }
            steps
        });
        Self { lanes }
    }

    pub fn hits(&self) -> usize {
        self.lanes.iter().flatten().filter(|&&v| v > 0.0).count()
    }
}

pub struct StepSequencer {
    pattern: Pattern,
    samples_per_step: f64,
    gate_samples: f64,
    /// Samples until the next step fires
    until_step: f64,
    step: usize,
    /// Samples until each part's note-off, when one is pending
    gates: [Option<f64>; NUM_PARTS],
}

impl StepSequencer {
    pub fn new(pattern: Pattern, bpm: f64, sample_rate: f64) -> Self {
        // Four steps per beat
        let samples_per_step = sample_rate * 60.0 / bpm / 4.0;
        Self {
            pattern,
            samples_per_step,
            gate_samples: samples_per_step * 0.5,
            until_step: 0.0,
            step: 0,
            gates: [None; NUM_PARTS],
        }
    }

    #[cfg(test)]
    fn step(&self) -> usize {
        self.step
    }

    /// Push the events due at the start of a `frames`-long block.
    ///
    /// `events` should be preallocated; nothing is pushed past its capacity.
    pub fn process_block(&mut self, frames: usize, events: &mut Vec<DrumEvent>) {
        for (part, gate) in self.gates.iter_mut().enumerate() {
            if gate.is_some_and(|remaining| remaining <= 0.0) {
                *gate = None;
                push(
                    events,
                    DrumEvent::NoteOff {
                        channel: DRUM_CHANNEL,
                        note: GM_NOTE_MAP[part],
                    },
                );
            }
        }

        while self.until_step <= 0.0 {
            for part in 0..NUM_PARTS {
                let velocity = self.pattern.lanes[part][self.step];
                if velocity > 0.0 {
                    push(
                        events,
                        DrumEvent::NoteOn {
                            channel: DRUM_CHANNEL,
                            note: GM_NOTE_MAP[part],
                            velocity,
                        },
                    );
                    self.gates[part] = Some(self.gate_samples);
                }
            }
            self.step = (self.step + 1) % STEPS;
            self.until_step += self.samples_per_step;
        }

        let elapsed = frames as f64;
        self.until_step -= elapsed;
        for remaining in self.gates.iter_mut().flatten() {
            *remaining -= elapsed;
        }
    }
}

#[inline]
fn push(events: &mut Vec<DrumEvent>, event: DrumEvent) {
    if events.len() < events.capacity() {
        events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_block_plays_step_zero() {
        let pattern = Pattern::parse(["X...", "....", "x...", "...."]);
        let mut seq = StepSequencer::new(pattern, 120.0, 1_000.0);
        let mut events = Vec::with_capacity(16);

        seq.process_block(10, &mut events);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DrumEvent::NoteOn { note: 36, velocity, .. } if velocity == 1.0));
        assert!(matches!(events[1], DrumEvent::NoteOn { note: 42, .. }));
        assert_eq!(seq.step(), 1);
    }

    #[test]
    fn gate_closes_with_note_off() {
        let pattern = Pattern::parse(["X", "", "", ""]);
        // 125 samples per step, 62.5 sample gate
        let mut seq = StepSequencer::new(pattern, 120.0, 1_000.0);
        let mut events = Vec::with_capacity(16);

        seq.process_block(100, &mut events);
        events.clear();
        seq.process_block(10, &mut events);
        assert_eq!(
            events,
            vec![DrumEvent::NoteOff {
                channel: DRUM_CHANNEL,
                note: 36
            }]
        );
    }
}
