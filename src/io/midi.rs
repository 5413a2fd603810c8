/// Raw channel-voice messages. Channels are 0-based, as on the wire.
///
/// Control change and pitch bend are parsed for hosts that route them to
/// something other than the drum engine. The converter drops both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyAftertouch { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, value: i16 },
}

impl MidiEvent {
    /// Parse one complete message. System and truncated messages yield `None`.
    ///
    /// A note-on with velocity 0 is reported as a note-off.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let d0 = data.first().map(|b| b & 0x7F);
        let d1 = data.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: d0?,
                velocity: d1?,
            }),
            0x90 => {
                let (key, velocity) = (d0?, d1?);
                if velocity == 0 {
                    Some(MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    })
                }
            }
            0xA0 => Some(MidiEvent::PolyAftertouch {
                channel,
                key: d0?,
                pressure: d1?,
            }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: d0?,
                value: d1?,
            }),
            0xD0 => Some(MidiEvent::ChannelPressure {
                channel,
                pressure: d0?,
            }),
            0xE0 => {
                let raw = (u16::from(d1?) << 7) | u16::from(d0?);
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw as i16 - 8192,
                })
            }
            _ => None,
        }
    }
}
