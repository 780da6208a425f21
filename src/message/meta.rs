use alloc::vec::Vec;

#[doc = r#"
A meta message: `FF <type> <length> <payload>`

Only two types are understood here. Everything else is kept as an
opaque payload so it survives a read/write round trip.

- `FF 2F 00` End of Track, which must close every track chunk
- `FF 51 03 tt tt tt` Set Tempo, in microseconds per quarter note
"#]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetaMessage {
    kind: u8,
    data: Vec<u8>,
}

impl MetaMessage {
    /// The meta type of End of Track
    pub const END_OF_TRACK: u8 = 0x2F;
    /// The meta type of Set Tempo
    pub const TEMPO: u8 = 0x51;

    /// Create a meta message from its type byte and payload
    pub fn new(kind: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// The End of Track message
    pub const fn end_of_track() -> Self {
        Self {
            kind: Self::END_OF_TRACK,
            data: Vec::new(),
        }
    }

    /// A Set Tempo message.
    ///
    /// Only the low 24 bits of `micros_per_quarter_note` are stored.
    pub fn tempo(micros_per_quarter_note: u32) -> Self {
        let [_, a, b, c] = micros_per_quarter_note.to_be_bytes();
        Self::new(Self::TEMPO, [a, b, c])
    }

    /// The type byte
    pub const fn kind(&self) -> u8 {
        self.kind
    }

    /// The payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True if this message ends a track
    pub const fn is_end_of_track(&self) -> bool {
        self.kind == Self::END_OF_TRACK
    }

    /// Microseconds per quarter note, if this is a well-formed tempo message
    pub fn tempo_micros(&self) -> Option<u32> {
        match (self.kind, self.data.as_slice()) {
            (Self::TEMPO, [a, b, c]) => Some(u32::from_be_bytes([0, *a, *b, *c])),
            _ => None,
        }
    }
}

#[test]
fn tempo_payload() {
    let tempo = MetaMessage::tempo(500_000);
    assert_eq!(tempo.data(), &[0x07, 0xA1, 0x20]);
    assert_eq!(tempo.tempo_micros(), Some(500_000));
    assert!(!tempo.is_end_of_track());
    assert!(MetaMessage::end_of_track().is_end_of_track());
}
