use crate::{prelude::*, varlen};
use alloc::vec::Vec;

/// An event preceded by the number of ticks since the previous event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackEvent {
    delta_ticks: u32,
    event: TrackMessage,
}

impl TrackEvent {
    /// Create a new track event
    pub fn new(delta_ticks: u32, event: impl Into<TrackMessage>) -> Self {
        Self {
            delta_ticks,
            event: event.into(),
        }
    }
    /// Ticks elapsed since the previous event in the track
    pub const fn delta_ticks(&self) -> u32 {
        self.delta_ticks
    }
    /// The event
    pub const fn event(&self) -> &TrackMessage {
        &self.event
    }
    /// Take the event out
    pub fn into_event(self) -> TrackMessage {
        self.event
    }
}

/// An event paired with its absolute position in ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticked<E> {
    accumulated_ticks: u64,
    /// The event
    pub event: E,
}

impl<E> Ticked<E> {
    /// Create a new ticked event
    pub const fn new(accumulated_ticks: u64, event: E) -> Self {
        Self {
            accumulated_ticks,
            event,
        }
    }
    /// Ticks since the start of the track
    pub const fn accumulated_ticks(&self) -> u64 {
        self.accumulated_ticks
    }
    /// The event
    pub const fn event(&self) -> &E {
        &self.event
    }
}

#[doc = r#"
An ordered sequence of delta-timed events.

A track owns its events. Tracks produced by [`MidiFile::parse`] always
end with exactly one end-of-track meta message; tracks built by hand may
omit it, the writer closes them.
"#]
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Track {
    pub(crate) events: Vec<TrackEvent>,
}

impl Track {
    /// Create a track from delta-timed events
    pub fn new(events: Vec<TrackEvent>) -> Self {
        Self { events }
    }

    /// Build a track from events at absolute ticks.
    ///
    /// An event earlier than its predecessor is placed at the
    /// predecessor's tick. Every gap must fit in a variable-length quantity.
    pub fn from_ticked<I>(events: I) -> Result<Self, OutOfRange>
    where
        I: IntoIterator<Item = Ticked<TrackMessage>>,
    {
        let mut previous = 0u64;
        let events = events
            .into_iter()
            .map(|ticked| {
                let tick = ticked.accumulated_ticks();
                let delta = tick.saturating_sub(previous);
                previous = previous.max(tick);
                if delta > varlen::MAX_VALUE as u64 {
                    return Err(OutOfRange::new(delta, varlen::MAX_VALUE as u64));
                }
                Ok(TrackEvent::new(delta as u32, ticked.event))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { events })
    }

    /// The events of the track
    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    /// Consume the track into its events
    pub fn into_events(self) -> Vec<TrackEvent> {
        self.events
    }

    /// Append an event
    pub fn push(&mut self, event: TrackEvent) {
        self.events.push(event);
    }

    /// The number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the track holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True if the last event is end-of-track
    pub fn ends_with_end_of_track(&self) -> bool {
        self.events
            .last()
            .is_some_and(|e| e.event().is_end_of_track())
    }

    /// The absolute tick of the last event
    pub fn end_tick(&self) -> u64 {
        self.events.iter().map(|e| e.delta_ticks() as u64).sum()
    }

    /// Iterate the events with their absolute ticks
    pub fn ticked(&self) -> TickedEvents<'_> {
        TickedEvents::new(self)
    }

    /// Consume the track into events with absolute ticks
    pub fn into_ticked(self) -> IntoTickedEvents {
        IntoTickedEvents::new(self)
    }
}

#[test]
fn from_ticked_delta_encodes() {
    let on = |key| {
        TrackMessage::from(ChannelVoiceMessage::new(
            Channel::One,
            VoiceEvent::NoteOn {
                key: Key::new(key).unwrap(),
                velocity: Velocity::new(90).unwrap(),
            },
        ))
    };
    let track = Track::from_ticked([
        Ticked::new(0, on(60)),
        Ticked::new(0, on(64)),
        Ticked::new(480, on(67)),
    ])
    .unwrap();
    let deltas: Vec<u32> = track.events().iter().map(|e| e.delta_ticks()).collect();
    assert_eq!(deltas, [0, 0, 480]);
    assert_eq!(track.end_tick(), 480);
    assert!(!track.ends_with_end_of_track());
}

#[test]
fn from_ticked_rejects_huge_gaps() {
    let result = Track::from_ticked([Ticked::new(
        varlen::MAX_VALUE as u64 + 1,
        TrackMessage::Meta(MetaMessage::end_of_track()),
    )]);
    assert!(result.is_err());
}
