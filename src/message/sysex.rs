use alloc::vec::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The status byte that introduced a system exclusive event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SysExKind {
    /// `F0`: a message, or the first packet of one
    Start = 0xF0,
    /// `F7`: a continuation packet, or an escape for arbitrary bytes
    Escape = 0xF7,
}

#[doc = r#"
A system exclusive event: `F0|F7 <length> <payload>`.

The payload is never interpreted, it is kept exactly as read.
"#]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SystemExclusiveMessage {
    kind: SysExKind,
    data: Vec<u8>,
}

impl SystemExclusiveMessage {
    /// Create a new sysex message
    pub fn new(kind: SysExKind, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Which status byte introduced the event
    pub const fn kind(&self) -> SysExKind {
        self.kind
    }

    /// The opaque payload (after the length)
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
