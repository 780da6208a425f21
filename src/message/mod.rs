#![doc = r#"
The events that can appear in a track chunk

# Overview

A track chunk holds three kinds of events:

- [`ChannelVoiceMessage`]: notes, controllers, programs and the like,
  addressed to one of sixteen channels.
- [`SystemExclusiveMessage`]: opaque manufacturer data, kept byte for byte.
- [`MetaMessage`]: file-only information such as tempo and end-of-track.

[`TrackMessage`] is the tagged union of the three.
"#]

pub mod channel;
pub use channel::*;

mod meta;
pub use meta::*;

mod sysex;
pub use sysex::*;

/// Any event that can be stored in a track
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrackMessage {
    /// A channel voice message
    ChannelVoice(ChannelVoiceMessage),
    /// A system exclusive message
    SystemExclusive(SystemExclusiveMessage),
    /// A meta message
    Meta(MetaMessage),
}

impl TrackMessage {
    /// True if this is the end-of-track meta message
    pub fn is_end_of_track(&self) -> bool {
        matches!(self, TrackMessage::Meta(m) if m.is_end_of_track())
    }

    /// Returns the channel voice message, if any
    pub const fn channel_voice(&self) -> Option<&ChannelVoiceMessage> {
        match self {
            TrackMessage::ChannelVoice(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<ChannelVoiceMessage> for TrackMessage {
    fn from(value: ChannelVoiceMessage) -> Self {
        Self::ChannelVoice(value)
    }
}

impl From<SystemExclusiveMessage> for TrackMessage {
    fn from(value: SystemExclusiveMessage) -> Self {
        Self::SystemExclusive(value)
    }
}

impl From<MetaMessage> for TrackMessage {
    fn from(value: MetaMessage) -> Self {
        Self::Meta(value)
    }
}
