use core::fmt;
use thiserror::Error;

/// A value that does not fit the range its field allows.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("value {value} is out of range (max {max})")]
pub struct OutOfRange {
    /// The offending value
    pub value: u64,
    /// The largest value the field accepts
    pub max: u64,
}

impl OutOfRange {
    /// Create a new out of range error
    pub const fn new(value: u64, max: u64) -> Self {
        Self { value, max }
    }
}

#[doc = r#"
A 7-bit MIDI data byte.

Every data byte in a channel message has a leading `0` bit, so the
representable values are `0..=127`. Construction is checked; a value
above `127` is rejected rather than clamped.

# Example
```rust
# use midicsv::prelude::*;
let byte = DataByte::new(100).unwrap();
assert_eq!(byte.value(), 100);

assert!(DataByte::new(128).is_err());
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct DataByte(pub(crate) u8);

impl DataByte {
    /// The largest value a data byte can hold
    pub const MAX: u8 = 0x7F;

    /// Create a new data byte, checking for a leading 0 bit.
    pub const fn new(byte: u8) -> Result<Self, OutOfRange> {
        if byte > Self::MAX {
            return Err(OutOfRange::new(byte as u64, Self::MAX as u64));
        }
        Ok(Self(byte))
    }

    /// Create a data byte, masking off the leading bit
    pub const fn new_masked(byte: u8) -> Self {
        Self(byte & Self::MAX)
    }

    /// Returns the underlying byte
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DataByte {
    type Error = OutOfRange;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DataByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! data_byte_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
        pub struct $name(DataByte);

        impl $name {
            /// Create a new value, checking that it fits in 7 bits.
            pub const fn new(byte: u8) -> Result<Self, OutOfRange> {
                match DataByte::new(byte) {
                    Ok(b) => Ok(Self(b)),
                    Err(e) => Err(e),
                }
            }

            /// Wrap an already validated data byte
            pub const fn from_databyte(byte: DataByte) -> Self {
                Self(byte)
            }

            /// Returns the underlying byte
            pub const fn byte(&self) -> u8 {
                self.0.0
            }

            /// Returns the value as a data byte
            pub const fn databyte(&self) -> DataByte {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

data_byte_newtype!(
    /// The pitch number of a note message, `0..=127`.
    ///
    /// `60` is middle C. No pitch naming is attached.
    Key
);

data_byte_newtype!(
    /// The velocity of a note message, `0..=127`.
    ///
    /// A note-on with velocity `0` is read as a note-off.
    Velocity
);

data_byte_newtype!(
    /// A program (patch) number, passed through unchanged.
    Program
);

#[test]
fn data_byte_rejects_high_bit() {
    assert_eq!(DataByte::new(0x7F).map(|b| b.value()), Ok(0x7F));
    assert_eq!(DataByte::new(0x80), Err(OutOfRange::new(0x80, 0x7F)));
    assert_eq!(DataByte::new_masked(0xFF).value(), 0x7F);
}

#[test]
fn newtypes_share_validation() {
    assert_eq!(Key::new(60).unwrap().byte(), 60);
    assert!(Velocity::new(200).is_err());
    assert_eq!(Program::new(0).unwrap().databyte(), DataByte(0));
}
