#![doc = r#"
Pairing note events into [`Note`]s, and laying notes back out as a track

[`track_to_notes`] walks a track in tick order and keeps, per
`(channel, key)`, a stack of sounding notes. A note-on pushes; a note-off
(or a note-on with velocity `0`) closes the most recently opened one.
Overlapping notes on the same key therefore pair last-in first-out.

[`notes_to_track`] is the inverse. Each note becomes a note-on and a
note-off at absolute ticks. At equal ticks note-offs come first, so a
note that ends exactly where the next one on the same key begins is not
closed by the wrong event when read back.

# Example
```rust
# use midicsv::prelude::*;
let note = Note::new(
    Channel::One,
    Key::new(60).unwrap(),
    Velocity::new(100).unwrap(),
    0,
    480,
)
.unwrap();

let track = notes_to_track(&[note.clone()], &AssemblerConfig::default()).unwrap();
assert_eq!(track_to_notes(&track).unwrap(), vec![note]);
```
"#]

use crate::{OutOfRange, prelude::*};
use alloc::vec::Vec;
use std::collections::HashMap;
use thiserror::Error;

/// A sounding pitch with a start and a positive length, both in ticks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    channel: Channel,
    key: Key,
    velocity: Velocity,
    start_tick: u64,
    duration_ticks: u64,
}

impl Note {
    /// Create a note.
    ///
    /// The velocity must be at least `1` and the duration positive.
    pub fn new(
        channel: Channel,
        key: Key,
        velocity: Velocity,
        start_tick: u64,
        duration_ticks: u64,
    ) -> Result<Self, NoteError> {
        if velocity.byte() == 0 {
            return Err(NoteError::ZeroVelocity { start_tick });
        }
        if duration_ticks == 0 {
            return Err(NoteError::ZeroDuration { start_tick });
        }
        if start_tick.checked_add(duration_ticks).is_none() {
            return Err(NoteError::TickOverflow { start_tick });
        }
        Ok(Self {
            channel,
            key,
            velocity,
            start_tick,
            duration_ticks,
        })
    }

    /// The channel the note plays on
    pub const fn channel(&self) -> Channel {
        self.channel
    }
    /// The pitch
    pub const fn key(&self) -> Key {
        self.key
    }
    /// The note-on velocity, `1..=127`
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }
    /// Absolute tick of the note-on
    pub const fn start_tick(&self) -> u64 {
        self.start_tick
    }
    /// Length in ticks, always positive
    pub const fn duration_ticks(&self) -> u64 {
        self.duration_ticks
    }
    /// Absolute tick of the note-off
    pub const fn end_tick(&self) -> u64 {
        self.start_tick + self.duration_ticks
    }
}

/// An error while pairing or laying out notes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteError {
    /// A note-on was still sounding when the track ended
    #[error("Note {key} on channel {channel} starting at tick {start_tick} is never released")]
    UnterminatedNote {
        /// Channel of the note-on
        channel: Channel,
        /// Pitch of the note-on
        key: Key,
        /// Absolute tick of the note-on
        start_tick: u64,
    },
    /// A note-on hit a key that was already sounding
    #[error("Note {key} on channel {channel} is retriggered at tick {tick}")]
    Retrigger {
        /// Channel of the note-on
        channel: Channel,
        /// Pitch of the note-on
        key: Key,
        /// Absolute tick of the second note-on
        tick: u64,
    },
    /// A note must be struck with velocity `1` or more
    #[error("Note at tick {start_tick} has velocity 0")]
    ZeroVelocity {
        /// Start of the offending note
        start_tick: u64,
    },
    /// A note must last at least one tick
    #[error("Note at tick {start_tick} has no duration")]
    ZeroDuration {
        /// Start of the offending note
        start_tick: u64,
    },
    /// The note ends beyond the largest representable tick
    #[error("Note at tick {start_tick} ends past the last representable tick")]
    TickOverflow {
        /// Start of the offending note
        start_tick: u64,
    },
    /// A gap between events does not fit a delta time
    #[error("Delta time {0}")]
    ValueOutOfRange(#[from] OutOfRange),
}

/// Options for pairing and laying out notes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Velocity carried by generated note-offs (default: `64`)
    pub note_off_velocity: Velocity,
    /// Microseconds per quarter note of the tempo event placed at tick 0.
    ///
    /// `None` writes no tempo event. Default: `Some(500_000)`, 120 bpm.
    pub tempo: Option<u32>,
    /// Fail on a note-on for a key that is already sounding instead of
    /// stacking it (default: `false`)
    pub strict_retrigger: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            note_off_velocity: Velocity::from_databyte(DataByte::new_masked(64)),
            tempo: Some(500_000),
            strict_retrigger: false,
        }
    }
}

struct Sounding {
    tick: u64,
    velocity: Velocity,
    order: usize,
}

/// Pair the note events of `track` with the default configuration.
///
/// See [`track_to_notes_with`].
pub fn track_to_notes(track: &Track) -> Result<Vec<Note>, NoteError> {
    track_to_notes_with(track, &AssemblerConfig::default())
}

/// Pair the note events of `track` into notes, returned in note-on order.
///
/// A note-off with nothing sounding is ignored. A note that is released
/// at the tick it started is dropped. If any note is still sounding at the
/// end, the earliest one is reported as [`NoteError::UnterminatedNote`].
pub fn track_to_notes_with(
    track: &Track,
    config: &AssemblerConfig,
) -> Result<Vec<Note>, NoteError> {
    let mut sounding: HashMap<(Channel, Key), Vec<Sounding>> = HashMap::new();
    let mut notes: Vec<(usize, Note)> = Vec::new();
    let mut order = 0;

    for ticked in track.ticked() {
        let tick = ticked.accumulated_ticks();
        let Some(msg) = ticked.event().channel_voice() else {
            continue;
        };
        let channel = msg.channel();

        if let Some((key, velocity)) = msg.event().note_start() {
            let stack = sounding.entry((channel, key)).or_default();
            if config.strict_retrigger && !stack.is_empty() {
                return Err(NoteError::Retrigger { channel, key, tick });
            }
            stack.push(Sounding {
                tick,
                velocity,
                order,
            });
            order += 1;
        } else if let Some(key) = msg.event().note_end() {
            let Some(start) = sounding.get_mut(&(channel, key)).and_then(Vec::pop) else {
                tracing::debug!(%channel, %key, tick, "ignoring note-off with no sounding note");
                continue;
            };
            let duration_ticks = tick - start.tick;
            if duration_ticks == 0 {
                tracing::warn!(%channel, %key, tick, "dropping note of zero length");
                continue;
            }
            notes.push((
                start.order,
                Note {
                    channel,
                    key,
                    velocity: start.velocity,
                    start_tick: start.tick,
                    duration_ticks,
                },
            ));
        }
    }

    let unterminated = sounding
        .iter()
        .flat_map(|(slot, stack)| stack.iter().map(move |s| (*slot, s)))
        .min_by_key(|(_, s)| s.order);
    if let Some(((channel, key), start)) = unterminated {
        return Err(NoteError::UnterminatedNote {
            channel,
            key,
            start_tick: start.tick,
        });
    }

    notes.sort_by_key(|(order, _)| *order);
    Ok(notes.into_iter().map(|(_, note)| note).collect())
}

/// Lay out `notes` as a delta-timed track closed with end-of-track.
///
/// The tempo event from `config`, if any, comes first. Note events are
/// sorted by tick with note-offs before note-ons; the sort is stable, so
/// ties otherwise keep the order of `notes`.
pub fn notes_to_track(notes: &[Note], config: &AssemblerConfig) -> Result<Track, NoteError> {
    // note-offs sort before note-ons at the same tick
    let mut events: Vec<(u64, u8, TrackMessage)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        events.push((
            note.start_tick,
            1,
            ChannelVoiceMessage::new(
                note.channel,
                VoiceEvent::NoteOn {
                    key: note.key,
                    velocity: note.velocity,
                },
            )
            .into(),
        ));
        events.push((
            note.end_tick(),
            0,
            ChannelVoiceMessage::new(
                note.channel,
                VoiceEvent::NoteOff {
                    key: note.key,
                    velocity: config.note_off_velocity,
                },
            )
            .into(),
        ));
    }
    events.sort_by_key(|(tick, class, _)| (*tick, *class));

    let end = events.last().map_or(0, |(tick, _, _)| *tick);
    let tempo = config
        .tempo
        .map(|micros| Ticked::new(0, TrackMessage::from(MetaMessage::tempo(micros))));
    let ticked = tempo
        .into_iter()
        .chain(
            events
                .into_iter()
                .map(|(tick, _, event)| Ticked::new(tick, event)),
        )
        .chain(core::iter::once(Ticked::new(
            end,
            TrackMessage::from(MetaMessage::end_of_track()),
        )));

    Ok(Track::from_ticked(ticked)?)
}
