use core::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::OutOfRange;

#[doc = r#"
One of the sixteen MIDI channels.

`Channel::One` is the channel carried as nibble `0` in a status byte.
"#]
#[allow(missing_docs)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum Channel {
    One = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Eleven,
    Twelve,
    Thirteen,
    Fourteen,
    Fifteen,
    Sixteen,
}

impl Channel {
    /// Create a channel from its zero-based index.
    pub fn new(index: u8) -> Result<Self, OutOfRange> {
        Self::try_from(index).map_err(|e| OutOfRange::new(e.number as u64, 15))
    }

    /// Extract the channel from the low nibble of a status byte
    pub fn from_status(status: u8) -> Self {
        // the low nibble is always a valid index
        Self::try_from(status & 0x0F).unwrap_or(Channel::One)
    }

    /// Returns the zero-based index of the channel, `0..=15`
    pub fn index(self) -> u8 {
        self.into()
    }

    /// All channels, lowest first
    pub fn all() -> [Channel; 16] {
        core::array::from_fn(|i| Self::from_status(i as u8))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[test]
fn channel_from_index() {
    assert_eq!(Channel::new(0), Ok(Channel::One));
    assert_eq!(Channel::new(15), Ok(Channel::Sixteen));
    assert_eq!(Channel::new(16), Err(OutOfRange::new(16, 15)));
}

#[test]
fn channel_from_status_nibble() {
    assert_eq!(Channel::from_status(0x93), Channel::Four);
    assert_eq!(Channel::from_status(0xCF).index(), 15);
    assert_eq!(Channel::all()[9], Channel::Ten);
}
