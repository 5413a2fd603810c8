use crate::{io::midi::MidiEvent, synth::message::DrumEvent};

/// Convert a raw MIDI message into an engine event.
///
/// Wire channels (0-15) become 1-based and 7-bit values are scaled to 0..1.
/// Messages the engine has no use for yield `None`.
pub fn midi_to_drum_event(midi: MidiEvent) -> Option<DrumEvent> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } => Some(DrumEvent::NoteOn {
            channel: channel + 1,
            note: key,
            velocity: unit(velocity),
        }),
        MidiEvent::NoteOff { channel, key, .. } => Some(DrumEvent::NoteOff {
            channel: channel + 1,
            note: key,
        }),
        MidiEvent::ChannelPressure { channel, pressure } => Some(DrumEvent::ChannelPressure {
            channel: channel + 1,
            pressure: unit(pressure),
        }),
        MidiEvent::PolyAftertouch { key, pressure, .. } => Some(DrumEvent::PolyAftertouch {
            note: key,
            pressure: unit(pressure),
        }),
        MidiEvent::ControlChange { .. } | MidiEvent::PitchBend { .. } => None,
    }
}

#[inline]
fn unit(value: u8) -> f32 {
    f32::from(value.min(127)) / 127.0
}
