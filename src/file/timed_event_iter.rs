use crate::prelude::*;

/// An iterator returned from [`Track::ticked`].
///
/// Accumulates delta times into absolute ticks.
pub struct TickedEvents<'a> {
    ticks: u64,
    events: core::slice::Iter<'a, TrackEvent>,
}

impl<'a> TickedEvents<'a> {
    pub(super) fn new(track: &'a Track) -> Self {
        Self {
            ticks: 0,
            events: track.events.iter(),
        }
    }
}

impl<'a> Iterator for TickedEvents<'a> {
    type Item = Ticked<&'a TrackMessage>;
    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.next()?;
        self.ticks += event.delta_ticks() as u64;
        Some(Ticked::new(self.ticks, event.event()))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.events.size_hint()
    }
}

/// An iterator returned from [`Track::into_ticked`].
pub struct IntoTickedEvents {
    ticks: u64,
    events: alloc::vec::IntoIter<TrackEvent>,
}

impl IntoTickedEvents {
    pub(super) fn new(track: Track) -> Self {
        Self {
            ticks: 0,
            events: track.events.into_iter(),
        }
    }
}

impl Iterator for IntoTickedEvents {
    type Item = Ticked<TrackMessage>;
    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.next()?;
        self.ticks += event.delta_ticks() as u64;
        Some(Ticked::new(self.ticks, event.into_event()))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.events.size_hint()
    }
}

#[cfg(test)]
fn note_on_event(delta_ticks: u32, key: u8, velocity: u8, channel: u8) -> TrackEvent {
    TrackEvent::new(
        delta_ticks,
        ChannelVoiceMessage::new(
            Channel::new(channel).unwrap(),
            VoiceEvent::NoteOn {
                key: Key::new(key).unwrap(),
                velocity: Velocity::new(velocity).unwrap(),
            },
        ),
    )
}

#[cfg(test)]
fn tempo_event(delta_ticks: u32, micros_per_quarter: u32) -> TrackEvent {
    TrackEvent::new(delta_ticks, MetaMessage::tempo(micros_per_quarter))
}

#[test]
fn test_empty_track_yields_nothing() {
    let track = Track::new(alloc::vec![]);
    assert_eq!(track.ticked().next(), None);
}

#[test]
fn test_single_track_multiple_events_with_delta_time() {
    let track = Track::new(alloc::vec![
        tempo_event(0, 500_000),
        note_on_event(0, 60, 100, 0),
        note_on_event(480, 60, 0, 0),
        note_on_event(240, 62, 80, 0),
    ]);

    let ticks: alloc::vec::Vec<_> = track.ticked().map(|t| t.accumulated_ticks()).collect();
    assert_eq!(ticks, [0, 0, 480, 720]);
}

#[test]
fn test_owned_iteration_matches_borrowed() {
    let track = Track::new(alloc::vec![
        note_on_event(10, 60, 100, 3),
        note_on_event(5, 60, 0, 3),
    ]);
    let borrowed: alloc::vec::Vec<_> = track
        .ticked()
        .map(|t| (t.accumulated_ticks(), t.event.clone()))
        .collect();
    let owned: alloc::vec::Vec<_> = track
        .into_ticked()
        .map(|t| (t.accumulated_ticks(), t.event))
        .collect();
    assert_eq!(borrowed, owned);
    assert_eq!(owned[1].0, 15);
}
