use rtrb::Consumer;

use crate::{GM_NOTE_MAP, NUM_PARTS};

/// MIDI channel (1-based) that addresses parts through the GM drum map.
pub const DRUM_CHANNEL: u8 = 10;

/// Block-level control events consumed by the engine.
///
/// Channels are 1-based. Velocities and pressures are normalised to 0..1.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrumEvent {
    NoteOn { channel: u8, note: u8, velocity: f32 },
    NoteOff { channel: u8, note: u8 },
    ChannelPressure { channel: u8, pressure: f32 },
    PolyAftertouch { note: u8, pressure: f32 },
}

/// Part addressed by a GM drum note, if any.
pub fn part_for_note(note: u8) -> Option<usize> {
    GM_NOTE_MAP.iter().position(|&n| n == note)
}

/// Part addressed directly by channels 1-4.
fn part_for_channel(channel: u8) -> Option<usize> {
    let index = usize::from(channel).checked_sub(1)?;
    (index < NUM_PARTS).then_some(index)
}

impl DrumEvent {
    /// The part this event is routed to. Unmapped channels and notes yield `None`.
    pub fn target_part(&self) -> Option<usize> {
        match *self {
            DrumEvent::NoteOn { channel, note, .. } | DrumEvent::NoteOff { channel, note } => {
                if channel == DRUM_CHANNEL {
                    part_for_note(note)
                } else {
                    part_for_channel(channel)
                }
            }
            DrumEvent::ChannelPressure { channel, .. } => part_for_channel(channel),
            DrumEvent::PolyAftertouch { note, .. } => part_for_note(note),
        }
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<DrumEvent>;
}

impl MessageReceiver for Consumer<DrumEvent> {
    fn pop(&mut self) -> Option<DrumEvent> {
        Consumer::pop(self).ok()
    }
}
