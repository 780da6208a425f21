#![doc = r#"
Merging tracks with different divisions into one track

Each input is a group of tracks sharing a division, usually the tracks
of one file. The merged division is the least common multiple of every
input division, so each absolute tick scales by an exact integer factor.

When that multiple does not fit in a header (`> 0x7FFF`), the largest
input division is used instead and every scaled tick is rounded to the
nearest integer. A rounding error larger than
[`MergeConfig::rounding_tolerance`] fails the merge.

Inputs sharing channels would sound as one instrument after merging.
With [`ChannelPolicy::Reassign`], the first input keeps its channels and
each later input entering used channels is moved to the lowest channels
still free. Channel 10 is not held back for percussion, so a melodic
input may land on it.

The tracks of a format 2 file are independent patterns. They are merged
like the tracks of a format 1 file, all starting at tick 0.

# Example
```rust
# use midicsv::prelude::*;
let quarter = |division: u16| {
    let note = Note::new(
        Channel::One,
        Key::new(60).unwrap(),
        Velocity::new(100).unwrap(),
        0,
        division as u64,
    )
    .unwrap();
    let track = notes_to_track(&[note], &AssemblerConfig::default()).unwrap();
    (TicksPerQuarterNote::new(division).unwrap(), track)
};

let mut merger = TrackMerger::default();
let (division, track) = quarter(480);
merger.push(division, track);
let (division, track) = quarter(960);
merger.push(division, track);

let merged = merger.merge().unwrap();
assert_eq!(merged.division().ticks_per_quarter_note(), 960);

let notes = track_to_notes(merged.track()).unwrap();
assert_eq!(notes.len(), 2);
assert!(notes.iter().all(|n| n.start_tick() == 0 && n.duration_ticks() == 960));
assert_eq!(notes[1].channel(), Channel::Two);
```
"#]

use crate::{OutOfRange, prelude::*};
use alloc::vec::Vec;
use std::collections::HashMap;
use thiserror::Error;

/// How channels of different inputs are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelPolicy {
    /// Leave every channel as it is
    Keep,
    /// Move colliding channels of later inputs to the lowest free
    /// channels, channel 10 included
    #[default]
    Reassign,
}

/// Options for [`TrackMerger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeConfig {
    /// Largest rounding error accepted, in merged ticks, when the exact
    /// division does not fit (default: `0`)
    pub rounding_tolerance: u32,
    /// Channel handling across inputs (default: [`ChannelPolicy::Reassign`])
    pub channel_policy: ChannelPolicy,
}

/// An error while merging tracks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Nothing was pushed into the merger
    #[error("No tracks to merge")]
    NoInputs,
    /// The exact division is too large and rounding to the fallback loses time
    #[error(
        "Common division {lcm} does not fit, and tick {tick} of input {input} cannot be placed on division {fallback}"
    )]
    DivisionOverflow {
        /// Least common multiple of the input divisions, saturating
        lcm: u64,
        /// The division used instead
        fallback: u16,
        /// Index of the input whose tick could not be placed
        input: usize,
        /// The absolute tick in that input's division
        tick: u64,
    },
    /// Every channel is taken by earlier inputs
    #[error("No free channel left for input {input}")]
    ChannelExhausted {
        /// Index of the input that needed a channel
        input: usize,
    },
    /// A scaled tick or gap is too large to store
    #[error("Merged tick {0}")]
    ValueOutOfRange(#[from] OutOfRange),
}

struct MergeInput {
    division: TicksPerQuarterNote,
    tracks: Vec<Track>,
}

/// Collects tracks and merges them into one.
#[derive(Default)]
pub struct TrackMerger {
    config: MergeConfig,
    inputs: Vec<MergeInput>,
}

/// The output of [`TrackMerger::merge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTrack {
    division: TicksPerQuarterNote,
    track: Track,
}

impl MergedTrack {
    /// The merged division
    pub const fn division(&self) -> TicksPerQuarterNote {
        self.division
    }
    /// The merged track
    pub const fn track(&self) -> &Track {
        &self.track
    }
    /// A format 1 file holding the merged track
    pub fn into_file(self) -> MidiFile {
        MidiFile::single_track(self.division, self.track)
    }
}

impl TrackMerger {
    /// Create an empty merger
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            inputs: Vec::new(),
        }
    }

    /// Add one track as its own input
    pub fn push(&mut self, division: TicksPerQuarterNote, track: Track) -> &mut Self {
        self.push_group(division, alloc::vec![track])
    }

    /// Add every track of `file` as a single input.
    ///
    /// The tracks keep the channels they share with each other. The
    /// patterns of a format 2 file are laid over each other from tick 0.
    pub fn push_file(&mut self, file: MidiFile) -> &mut Self {
        if file.format_type() == FormatType::SequentiallyIndependent {
            tracing::warn!(
                tracks = file.tracks().len(),
                "merging format 2 patterns as simultaneous tracks"
            );
        }
        let division = file.division();
        self.push_group(division, file.into_tracks())
    }

    /// Add tracks sharing a division as a single input
    pub fn push_group(&mut self, division: TicksPerQuarterNote, tracks: Vec<Track>) -> &mut Self {
        self.inputs.push(MergeInput { division, tracks });
        self
    }

    /// The number of inputs pushed so far
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// True if nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Merge every input into one track.
    ///
    /// Events are placed at their scaled absolute ticks, concatenated in
    /// input order and stably sorted by tick. At one tick, note releases
    /// come first, then events other than notes, then note starts, so a
    /// note ending where another on the same key begins stays paired.
    /// End-of-track events of the inputs are dropped; one is placed at the
    /// latest input end.
    pub fn merge(self) -> Result<MergedTrack, MergeError> {
        if self.inputs.is_empty() {
            return Err(MergeError::NoInputs);
        }
        let scale = Scale::for_inputs(&self.inputs, self.config.rounding_tolerance);
        let mut channels = ChannelAllocator::default();
        let mut events: Vec<(u64, Rank, TrackMessage)> = Vec::new();
        let mut end = 0u64;

        for (index, input) in self.inputs.into_iter().enumerate() {
            let remap = match self.config.channel_policy {
                ChannelPolicy::Keep => ChannelMap::identity(),
                ChannelPolicy::Reassign => channels
                    .assign(&input.tracks)
                    .ok_or(MergeError::ChannelExhausted { input: index })?,
            };
            let from = input.division.ticks_per_quarter_note();

            for track in input.tracks {
                end = end.max(scale.apply(track.end_tick(), from, index)?);
                let mut ranks = TrackRanks::default();
                for ticked in track.into_ticked() {
                    if ticked.event().is_end_of_track() {
                        continue;
                    }
                    let tick = scale.apply(ticked.accumulated_ticks(), from, index)?;
                    let rank = ranks.rank(tick, ticked.event());
                    events.push((tick, rank, remap.apply(ticked.event)));
                }
            }
        }

        events.sort_by_key(|(tick, rank, _)| (*tick, *rank));
        tracing::debug!(
            division = %scale.division,
            events = events.len(),
            end,
            "merged tracks"
        );
        let end_of_track = Ticked::new(end, TrackMessage::from(MetaMessage::end_of_track()));
        let track = Track::from_ticked(
            events
                .into_iter()
                .map(|(tick, _, event)| Ticked::new(tick, event))
                .chain(core::iter::once(end_of_track)),
        )?;

        Ok(MergedTrack {
            division: scale.division,
            track,
        })
    }
}

/// Order of merged events sharing a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    NoteEnd,
    Other,
    NoteStart,
}

/// Ranks the events of one track in order.
///
/// A release of a note started at the same merged tick ranks with the
/// note starts, so it stays behind its own note-on.
#[derive(Default)]
struct TrackRanks {
    sounding: HashMap<(Channel, Key), Vec<u64>>,
}

impl TrackRanks {
    fn rank(&mut self, tick: u64, event: &TrackMessage) -> Rank {
        let Some(msg) = event.channel_voice() else {
            return Rank::Other;
        };
        let channel = msg.channel();
        if let Some((key, _)) = msg.event().note_start() {
            self.sounding.entry((channel, key)).or_default().push(tick);
            Rank::NoteStart
        } else if let Some(key) = msg.event().note_end() {
            match self.sounding.get_mut(&(channel, key)).and_then(Vec::pop) {
                Some(start) if start == tick => Rank::NoteStart,
                _ => Rank::NoteEnd,
            }
        } else {
            Rank::Other
        }
    }
}

struct Scale {
    division: TicksPerQuarterNote,
    lcm: u64,
    tolerance: u32,
    exact: bool,
}

impl Scale {
    fn for_inputs(inputs: &[MergeInput], tolerance: u32) -> Self {
        let lcm = inputs
            .iter()
            .map(|i| i.division.ticks_per_quarter_note() as u64)
            .fold(1u64, |acc, d| lcm(acc, d));
        match u16::try_from(lcm).ok().and_then(TicksPerQuarterNote::new) {
            Some(division) => Self {
                division,
                lcm,
                tolerance: 0,
                exact: true,
            },
            None => {
                // inputs is non-empty, so a largest division exists
                let division = inputs
                    .iter()
                    .map(|i| i.division)
                    .max()
                    .unwrap_or_default();
                tracing::warn!(
                    lcm,
                    fallback = %division,
                    "common division too large, rounding onto the largest input division"
                );
                Self {
                    division,
                    lcm,
                    tolerance,
                    exact: false,
                }
            }
        }
    }

    /// Scale `tick` counted in `from` ticks per quarter note to the merged division
    fn apply(&self, tick: u64, from: u16, input: usize) -> Result<u64, MergeError> {
        let from = from as u128;
        let numerator = tick as u128 * self.division.ticks_per_quarter_note() as u128;
        let quotient = numerator / from;
        let remainder = numerator % from;
        let rounded = if remainder * 2 >= from {
            quotient + 1
        } else {
            quotient
        };
        if !self.exact {
            let error = (rounded * from).abs_diff(numerator);
            if error > self.tolerance as u128 * from {
                return Err(MergeError::DivisionOverflow {
                    lcm: self.lcm,
                    fallback: self.division.ticks_per_quarter_note(),
                    input,
                    tick,
                });
            }
        }
        u64::try_from(rounded).map_err(|_| OutOfRange::new(tick, u64::MAX).into())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Saturates at `u64::MAX`
fn lcm(a: u64, b: u64) -> u64 {
    (a / gcd(a, b)).saturating_mul(b)
}

/// Channels claimed by inputs merged so far
#[derive(Default)]
struct ChannelAllocator {
    taken: [bool; 16],
}

impl ChannelAllocator {
    /// Returns `None` when a colliding channel finds no free slot
    fn assign(&mut self, tracks: &[Track]) -> Option<ChannelMap> {
        let mut used = [false; 16];
        for msg in tracks
            .iter()
            .flat_map(|t| t.events())
            .filter_map(|e| e.event().channel_voice())
        {
            used[msg.channel().index() as usize] = true;
        }

        let mut occupied = self.taken;
        for (slot, is_used) in occupied.iter_mut().zip(used) {
            *slot |= is_used;
        }

        let mut map = ChannelMap::identity();
        for channel in Channel::all() {
            let index = channel.index() as usize;
            if !used[index] {
                continue;
            }
            if self.taken[index] {
                let free = occupied.iter().position(|slot| !slot)?;
                occupied[free] = true;
                let target = Channel::from_status(free as u8);
                tracing::debug!(from = %channel, to = %target, "reassigning channel");
                map.0[index] = target;
            }
        }

        for target in used
            .iter()
            .zip(map.0)
            .filter_map(|(is_used, target)| is_used.then_some(target))
        {
            self.taken[target.index() as usize] = true;
        }
        Some(map)
    }
}

struct ChannelMap([Channel; 16]);

impl ChannelMap {
    fn identity() -> Self {
        Self(Channel::all())
    }

    fn apply(&self, event: TrackMessage) -> TrackMessage {
        match event {
            TrackMessage::ChannelVoice(msg) => {
                let target = self.0[msg.channel().index() as usize];
                msg.with_channel(target).into()
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn division(ticks: u16) -> TicksPerQuarterNote {
        TicksPerQuarterNote::new(ticks).unwrap()
    }

    fn note(channel: Channel, key: u8, start: u64, duration: u64) -> Note {
        Note::new(
            channel,
            Key::new(key).unwrap(),
            Velocity::new(100).unwrap(),
            start,
            duration,
        )
        .unwrap()
    }

    fn track(notes: &[Note]) -> Track {
        notes_to_track(
            notes,
            &AssemblerConfig {
                tempo: None,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn quarter_notes_at_480_and_960() {
        let mut merger = TrackMerger::default();
        merger
            .push(division(480), track(&[note(Channel::One, 60, 0, 480)]))
            .push(division(960), track(&[note(Channel::One, 64, 0, 960)]));
        let merged = merger.merge().unwrap();

        assert_eq!(merged.division(), division(960));
        let notes = track_to_notes(merged.track()).unwrap();
        assert_eq!(
            notes,
            [
                note(Channel::One, 60, 0, 960),
                note(Channel::Two, 64, 0, 960),
            ]
        );

        let file = merged.into_file();
        assert_eq!(file.format_type(), FormatType::Simultaneous);
        assert_eq!(file.header().track_count(), 1);
    }

    #[test]
    fn least_common_multiple_keeps_relative_timing() {
        // a quarter in 3 and a quarter in 4 land on the same merged tick
        let mut merger = TrackMerger::new(MergeConfig {
            channel_policy: ChannelPolicy::Keep,
            ..Default::default()
        });
        merger
            .push(division(3), track(&[note(Channel::One, 60, 3, 6)]))
            .push(division(4), track(&[note(Channel::Two, 62, 4, 2)]));
        let merged = merger.merge().unwrap();
        assert_eq!(merged.division(), division(12));
        assert_eq!(
            track_to_notes(merged.track()).unwrap(),
            [
                note(Channel::One, 60, 12, 24),
                note(Channel::Two, 62, 12, 6),
            ]
        );
    }

    #[test]
    fn note_count_is_preserved() {
        let mut merger = TrackMerger::default();
        let mut expected = 0;
        for (i, ticks) in [96u16, 120, 240, 480, 384].into_iter().enumerate() {
            let notes: Vec<Note> = (0..=i as u64)
                .map(|n| note(Channel::One, 40 + n as u8, n * ticks as u64, ticks as u64))
                .collect();
            expected += notes.len();
            merger.push(division(ticks), track(&notes));
        }
        let merged = merger.merge().unwrap();
        assert_eq!(merged.division(), division(1920));
        assert_eq!(track_to_notes(merged.track()).unwrap().len(), expected);
    }

    #[test]
    fn end_of_track_is_placed_at_latest_end() {
        let padded = Track::new(alloc::vec![
            TrackEvent::new(0, MetaMessage::tempo(400_000)),
            TrackEvent::new(1000, MetaMessage::end_of_track()),
        ]);
        let mut merger = TrackMerger::default();
        merger
            .push(division(100), padded)
            .push(division(200), track(&[note(Channel::One, 60, 0, 200)]));
        let merged = merger.merge().unwrap();

        let track = merged.track();
        assert_eq!(track.end_tick(), 2000);
        assert_eq!(
            track.events().iter().filter(|e| e.event().is_end_of_track()).count(),
            1
        );
        assert!(track.ends_with_end_of_track());
        assert_eq!(
            track.events()[0].event(),
            &TrackMessage::from(MetaMessage::tempo(400_000))
        );
    }

    #[test]
    fn fallback_division_rounding() {
        let inputs = || {
            let mut merger = TrackMerger::new(MergeConfig {
                rounding_tolerance: 1,
                ..Default::default()
            });
            merger
                .push(division(0x7FFF), track(&[note(Channel::One, 60, 0, 0x7FFF)]))
                .push(division(0x7FFE), track(&[note(Channel::One, 61, 1, 0x7FFD)]));
            merger
        };

        let merged = inputs().merge().unwrap();
        assert_eq!(merged.division(), division(0x7FFF));
        assert_eq!(track_to_notes(merged.track()).unwrap().len(), 2);

        let mut strict = inputs();
        strict.config.rounding_tolerance = 0;
        assert_eq!(
            strict.merge(),
            Err(MergeError::DivisionOverflow {
                lcm: 0x7FFF * 0x7FFE,
                fallback: 0x7FFF,
                input: 1,
                tick: 1,
            })
        );
    }

    #[test]
    fn exact_ticks_survive_the_fallback() {
        let mut merger = TrackMerger::default();
        merger
            .push(division(0x7FFF), track(&[note(Channel::One, 60, 0, 0x7FFF)]))
            .push(division(0x7FFE), track(&[note(Channel::One, 61, 0, 0x7FFE)]));
        let notes = track_to_notes(merger.merge().unwrap().track()).unwrap();
        assert_eq!(notes[1].duration_ticks(), 0x7FFF);
    }

    #[test]
    fn channels_run_out() {
        let mut merger = TrackMerger::default();
        for input in 0..16 {
            merger.push(division(480), track(&[note(Channel::One, 60, input, 1)]));
        }
        let notes = track_to_notes(merger.merge().unwrap().track()).unwrap();
        let mut channels: Vec<Channel> = notes.iter().map(Note::channel).collect();
        channels.sort();
        assert_eq!(channels, Channel::all());

        let mut merger = TrackMerger::default();
        for input in 0..17 {
            merger.push(division(480), track(&[note(Channel::One, 60, input, 1)]));
        }
        assert_eq!(
            merger.merge(),
            Err(MergeError::ChannelExhausted { input: 16 })
        );
    }

    #[test]
    fn non_colliding_channels_stay() {
        let mut merger = TrackMerger::default();
        merger
            .push(
                division(480),
                track(&[note(Channel::One, 60, 0, 10), note(Channel::Two, 60, 0, 10)]),
            )
            .push(
                division(480),
                track(&[note(Channel::Two, 62, 0, 10), note(Channel::Five, 62, 0, 10)]),
            );
        let notes = track_to_notes(merger.merge().unwrap().track()).unwrap();
        let channels: Vec<Channel> = notes.iter().map(Note::channel).collect();
        assert_eq!(
            channels,
            [Channel::One, Channel::Two, Channel::Three, Channel::Five]
        );
    }

    #[test]
    fn tracks_of_one_file_share_channels() {
        let file = MidiFile::new(
            FormatType::Simultaneous,
            division(480),
            alloc::vec![
                track(&[note(Channel::One, 60, 0, 10)]),
                track(&[note(Channel::One, 64, 0, 10)]),
            ],
        )
        .unwrap();
        let mut merger = TrackMerger::default();
        merger.push_file(file);
        let notes = track_to_notes(merger.merge().unwrap().track()).unwrap();
        assert!(notes.iter().all(|n| n.channel() == Channel::One));
    }

    #[test]
    fn release_and_start_on_one_key_stay_paired() {
        // the second track releases key 60 where the first one strikes it
        let tracks = || {
            alloc::vec![
                track(&[note(Channel::One, 60, 480, 480)]),
                track(&[note(Channel::One, 60, 0, 480)]),
            ]
        };
        let expected = [
            note(Channel::One, 60, 0, 480),
            note(Channel::One, 60, 480, 480),
        ];

        let mut merger = TrackMerger::default();
        merger.push_file(MidiFile::new(FormatType::Simultaneous, division(480), tracks()).unwrap());
        assert_eq!(track_to_notes(merger.merge().unwrap().track()).unwrap(), expected);

        let mut merger = TrackMerger::new(MergeConfig {
            channel_policy: ChannelPolicy::Keep,
            ..Default::default()
        });
        for track in tracks() {
            merger.push(division(480), track);
        }
        assert_eq!(track_to_notes(merger.merge().unwrap().track()).unwrap(), expected);
    }

    #[test]
    fn zero_length_note_keeps_its_order() {
        let key = Key::new(60).unwrap();
        let on = ChannelVoiceMessage::new(
            Channel::One,
            VoiceEvent::NoteOn {
                key,
                velocity: Velocity::new(100).unwrap(),
            },
        );
        let off = ChannelVoiceMessage::new(
            Channel::One,
            VoiceEvent::NoteOff {
                key,
                velocity: Velocity::new(64).unwrap(),
            },
        );
        let blip = Track::new(alloc::vec![
            TrackEvent::new(10, on.clone()),
            TrackEvent::new(0, off.clone()),
            TrackEvent::new(0, MetaMessage::end_of_track()),
        ]);

        let mut merger = TrackMerger::default();
        merger.push(division(480), blip);
        let merged = merger.merge().unwrap();
        let events: Vec<&TrackMessage> = merged.track().events().iter().map(TrackEvent::event).collect();
        assert_eq!(
            events,
            [
                &TrackMessage::from(on),
                &TrackMessage::from(off),
                &TrackMessage::from(MetaMessage::end_of_track()),
            ]
        );
        assert!(track_to_notes(merged.track()).unwrap().is_empty());
    }

    #[test]
    fn controllers_come_before_notes_at_one_tick() {
        let program = Track::new(alloc::vec![
            TrackEvent::new(
                0,
                ChannelVoiceMessage::new(
                    Channel::One,
                    VoiceEvent::ProgramChange {
                        program: Program::new(5).unwrap(),
                    },
                ),
            ),
            TrackEvent::new(0, MetaMessage::end_of_track()),
        ]);
        let mut merger = TrackMerger::new(MergeConfig {
            channel_policy: ChannelPolicy::Keep,
            ..Default::default()
        });
        merger
            .push(division(480), track(&[note(Channel::One, 60, 0, 480)]))
            .push(division(480), program);
        let merged = merger.merge().unwrap();
        assert!(matches!(
            merged.track().events()[0].event().channel_voice().map(ChannelVoiceMessage::event),
            Some(VoiceEvent::ProgramChange { .. })
        ));
    }

    #[test]
    fn format_two_patterns_start_together() {
        let file = MidiFile::new(
            FormatType::SequentiallyIndependent,
            division(480),
            alloc::vec![
                track(&[note(Channel::One, 60, 0, 480)]),
                track(&[note(Channel::One, 62, 0, 480)]),
            ],
        )
        .unwrap();
        let mut merger = TrackMerger::default();
        merger.push_file(file);
        let notes = track_to_notes(merger.merge().unwrap().track()).unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.start_tick() == 0));
    }

    #[test]
    fn nothing_to_merge() {
        assert_eq!(TrackMerger::default().merge(), Err(MergeError::NoInputs));
    }
}
