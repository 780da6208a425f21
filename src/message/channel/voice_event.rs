use crate::prelude::*;

#[doc = r#"
The body of a channel voice message, without its channel.

The status nibble identifies the variant:

```text
0x8_  NoteOff            key, velocity
0x9_  NoteOn             key, velocity
0xA_  Aftertouch         key, pressure
0xB_  ControlChange      controller, value
0xC_  ProgramChange      program
0xD_  ChannelPressure    pressure
0xE_  PitchBend          lsb, msb
```
"#]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceEvent {
    /// A key was released
    NoteOff {
        /// The pitch released
        key: Key,
        /// Release velocity
        velocity: Velocity,
    },
    /// A key was pressed. Velocity `0` means released.
    NoteOn {
        /// The pitch pressed
        key: Key,
        /// Attack velocity
        velocity: Velocity,
    },
    /// Polyphonic key pressure
    Aftertouch {
        /// The pitch under pressure
        key: Key,
        /// Pressure amount
        pressure: DataByte,
    },
    /// A controller changed value
    ControlChange {
        /// Controller number
        controller: DataByte,
        /// New value
        value: DataByte,
    },
    /// Select a program (patch)
    ProgramChange {
        /// The program number
        program: Program,
    },
    /// Pressure applied to the whole channel
    ChannelPressure {
        /// Pressure amount
        pressure: DataByte,
    },
    /// Pitch wheel position, 14 bits split across two data bytes
    PitchBend {
        /// Low 7 bits
        lsb: DataByte,
        /// High 7 bits
        msb: DataByte,
    },
}

impl VoiceEvent {
    /// The high nibble of the status byte for this event.
    pub const fn status_nibble(&self) -> u8 {
        use VoiceEvent::*;
        match self {
            NoteOff { .. } => 0x80,
            NoteOn { .. } => 0x90,
            Aftertouch { .. } => 0xA0,
            ControlChange { .. } => 0xB0,
            ProgramChange { .. } => 0xC0,
            ChannelPressure { .. } => 0xD0,
            PitchBend { .. } => 0xE0,
        }
    }

    /// The number of data bytes following a status byte with this high nibble.
    pub const fn data_len(status: u8) -> usize {
        match status & 0xF0 {
            0xC0 | 0xD0 => 1,
            _ => 2,
        }
    }

    /// Build an event from a status byte and its data bytes.
    ///
    /// `second` is ignored for one-byte messages.
    pub const fn from_status(status: u8, first: DataByte, second: DataByte) -> Self {
        use VoiceEvent::*;
        match status & 0xF0 {
            0x80 => NoteOff {
                key: Key::from_databyte(first),
                velocity: Velocity::from_databyte(second),
            },
            0x90 => NoteOn {
                key: Key::from_databyte(first),
                velocity: Velocity::from_databyte(second),
            },
            0xA0 => Aftertouch {
                key: Key::from_databyte(first),
                pressure: second,
            },
            0xB0 => ControlChange {
                controller: first,
                value: second,
            },
            0xC0 => ProgramChange {
                program: Program::from_databyte(first),
            },
            0xD0 => ChannelPressure { pressure: first },
            _ => PitchBend {
                lsb: first,
                msb: second,
            },
        }
    }

    /// Append the data bytes of this event to `out`.
    pub fn write_data(&self, out: &mut Vec<u8>) {
        use VoiceEvent::*;
        match self {
            NoteOff { key, velocity } | NoteOn { key, velocity } => {
                out.extend([key.byte(), velocity.byte()])
            }
            Aftertouch { key, pressure } => out.extend([key.byte(), pressure.value()]),
            ControlChange { controller, value } => {
                out.extend([controller.value(), value.value()])
            }
            ProgramChange { program } => out.push(program.byte()),
            ChannelPressure { pressure } => out.push(pressure.value()),
            PitchBend { lsb, msb } => out.extend([lsb.value(), msb.value()]),
        }
    }

    /// Returns the key if this is a note-on that starts a note.
    pub const fn note_start(&self) -> Option<(Key, Velocity)> {
        match self {
            VoiceEvent::NoteOn { key, velocity } if velocity.byte() > 0 => Some((*key, *velocity)),
            _ => None,
        }
    }

    /// Returns the key if this event ends a note: a note-off, or a note-on with velocity 0.
    pub const fn note_end(&self) -> Option<Key> {
        match self {
            VoiceEvent::NoteOff { key, .. } => Some(*key),
            VoiceEvent::NoteOn { key, velocity } if velocity.byte() == 0 => Some(*key),
            _ => None,
        }
    }
}

#[test]
fn status_round_trip() {
    let first = DataByte::new(60).unwrap();
    let second = DataByte::new(100).unwrap();
    for status in [0x80u8, 0x90, 0xA0, 0xB0, 0xC0, 0xD0, 0xE0] {
        let event = VoiceEvent::from_status(status, first, second);
        assert_eq!(event.status_nibble(), status);

        let mut data = Vec::new();
        event.write_data(&mut data);
        assert_eq!(data.len(), VoiceEvent::data_len(status));
        assert_eq!(data[0], 60);
    }
}

#[test]
fn zero_velocity_note_on_ends_a_note() {
    let key = Key::new(64).unwrap();
    let silent = VoiceEvent::NoteOn {
        key,
        velocity: Velocity::new(0).unwrap(),
    };
    assert_eq!(silent.note_start(), None);
    assert_eq!(silent.note_end(), Some(key));

    let loud = VoiceEvent::NoteOn {
        key,
        velocity: Velocity::new(1).unwrap(),
    };
    assert_eq!(loud.note_start(), Some((key, Velocity::new(1).unwrap())));
    assert_eq!(loud.note_end(), None);
}
