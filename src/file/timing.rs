use core::fmt;

/// A representation of the `tpqn` timing for a MIDI file
///
/// This is the file's division: every delta time in every track is
/// counted in these ticks. The leading bit of the stored word selects
/// SMPTE timing, which is not supported, so the range is `1..=32767`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
pub struct TicksPerQuarterNote(u16);

impl TicksPerQuarterNote {
    /// The largest representable division
    pub const MAX: u16 = 0x7FFF;

    /// Returns `None` for zero or a value with the SMPTE bit set.
    pub const fn new(ticks: u16) -> Option<Self> {
        if ticks == 0 || ticks > Self::MAX {
            return None;
        }
        Some(Self(ticks))
    }

    /// Returns the ticks per quarter note for the file.
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.0
    }

    /// Returns the division as stored big-endian in the header chunk
    pub const fn to_be_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl Default for TicksPerQuarterNote {
    fn default() -> Self {
        Self(480)
    }
}

impl fmt::Display for TicksPerQuarterNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[test]
fn division_range() {
    assert_eq!(TicksPerQuarterNote::new(0), None);
    assert_eq!(TicksPerQuarterNote::new(0x8000), None);
    assert_eq!(
        TicksPerQuarterNote::new(960).map(|t| t.ticks_per_quarter_note()),
        Some(960)
    );
    assert_eq!(TicksPerQuarterNote::new(0x01E0).unwrap().to_be_bytes(), [0x01, 0xE0]);
}
