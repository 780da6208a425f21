#![doc = r#"
Contains the channel voice message types

# Hierarchy
```text
            |-----------------------|
            | Channel Voice Message |
            |-----------------------|
               /                \
      |---------|          |------------|
      | Channel |          | VoiceEvent |
      |---------|          |------------|
```

Channel mode messages (controllers 120-127) are carried as
[`VoiceEvent::ControlChange`] and are not interpreted.
"#]
mod voice_event;
pub use voice_event::*;

use crate::Channel;

#[doc = r#"
A voice event addressed to one channel
"#]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelVoiceMessage {
    channel: Channel,
    event: VoiceEvent,
}

impl ChannelVoiceMessage {
    /// Create a new channel voice message
    pub const fn new(channel: Channel, event: VoiceEvent) -> Self {
        Self { channel, event }
    }

    /// The channel the message is addressed to
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// The voice event
    pub const fn event(&self) -> &VoiceEvent {
        &self.event
    }

    /// The full status byte: event nibble and channel nibble
    pub fn status(&self) -> u8 {
        self.event.status_nibble() | self.channel.index()
    }

    /// The same event on a different channel
    pub const fn with_channel(self, channel: Channel) -> Self {
        Self {
            channel,
            event: self.event,
        }
    }
}

#[test]
fn status_combines_nibbles() {
    use crate::prelude::*;
    let msg = ChannelVoiceMessage::new(
        Channel::Ten,
        VoiceEvent::ProgramChange {
            program: Program::new(5).unwrap(),
        },
    );
    assert_eq!(msg.status(), 0xC9);
    assert_eq!(msg.with_channel(Channel::One).status(), 0xC0);
}
