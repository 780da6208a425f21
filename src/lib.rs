#![warn(missing_docs)]
#![doc = r#"
Convert Standard MIDI Files to note tables and back, and merge MIDI files

# Overview

The crate is layered:

- [`varlen`], [`reader`] and [`writer`] handle the byte level: chunks,
  variable-length quantities and running status.
- [`file`] and [`message`] are the event model: a [`MidiFile`](file::MidiFile)
  holds [`Track`](file::Track)s of delta-timed
  [`TrackMessage`](message::TrackMessage)s.
- [`note`] pairs note-on and note-off events into [`Note`](note::Note)s,
  and lays notes back out as a track.
- [`merge`] combines tracks with different divisions into one.
- [`csv_bridge`] reads and writes notes as CSV rows.
- [`convert`] ties everything together over files on disk.

# Example
```rust
use midicsv::prelude::*;

let csv = "track_index,channel,pitch,velocity,start_tick,duration_ticks\n0,0,60,100,0,480\n";

let midi = midicsv::csv_to_midi(csv.as_bytes(), &ConversionConfig::default()).unwrap();
let file = MidiFile::parse(&midi).unwrap();
assert_eq!(file.division().ticks_per_quarter_note(), 480);

let mut back = Vec::new();
midicsv::midi_to_csv(&midi, &mut back, &ConversionConfig::default()).unwrap();
assert_eq!(String::from_utf8(back).unwrap(), csv);
```

# Logging

Recoverable oddities in the input (a track without end-of-track, bytes
after the last track, stray note-offs) are reported through
[`tracing`]. The library never installs a subscriber.
"#]

extern crate alloc;

mod byte;
pub use byte::*;

mod channel;
pub use channel::*;

pub mod convert;
pub use convert::{
    convert_and_combine_midi_files, convert_and_combine_midi_files_with_config,
    convert_csv_to_midi, convert_csv_to_midi_with_config, convert_midi_to_csv,
    convert_midi_to_csv_with_config, combine_midis, csv_to_midi, midi_to_csv,
};

pub mod csv_bridge;

mod error;
pub use error::*;

pub mod file;
pub use file::FileError;

pub mod merge;
pub mod message;
pub mod note;
pub mod reader;
pub mod varlen;
pub mod writer;

/// Commonly used types and functions
pub mod prelude {
    pub use crate::{
        Channel, DataByte, Key, OutOfRange, Program, Velocity,
        convert::ConversionConfig,
        csv_bridge::{CsvError, NoteRow},
        file::*,
        merge::{ChannelPolicy, MergeConfig, MergeError, MergedTrack, TrackMerger},
        message::*,
        note::{
            AssemblerConfig, Note, NoteError, notes_to_track, track_to_notes, track_to_notes_with,
        },
        reader::{ReaderError, ReaderErrorKind},
        writer::{MidiWriter, WriterConfig, WriterError, WriterErrorKind},
    };
}
