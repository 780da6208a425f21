#![doc = r#"
Rusty representation of a [`MidiFile`]
"#]

/// Contains the [`MidiFileBuilder`] and associated
///
/// MIDI file chunk parsers.
pub mod builder;

mod format;
pub use format::*;

mod header;
pub use header::*;

mod track;
pub use track::*;

mod timed_event_iter;
pub use timed_event_iter::*;

mod timing;
pub use timing::*;

use crate::{
    file::builder::MidiFileBuilder,
    reader::{ReadResult, Reader},
    writer::{MidiWriter, WriteResult, WriterConfig},
};
use alloc::vec::Vec;
use thiserror::Error;

/// A file level inconsistency between the header and its tracks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileError {
    /// A format 0 file must contain exactly one track
    #[error("A format 0 file must hold exactly one track, found {0}")]
    TrackCountMismatch(usize),
    /// The track count does not fit the 16-bit header field
    #[error("{0} tracks do not fit in a MIDI file header")]
    TooManyTracks(usize),
    /// A second header chunk was found
    #[error("Duplicate header chunk")]
    DuplicateHeader,
    /// A track chunk came before the header chunk
    #[error("The file has no header chunk")]
    NoHeader,
    /// Fewer track chunks than the header declares
    #[error("The header declares {declared} tracks, found {found}")]
    MissingTracks {
        /// Track count in the header
        declared: u16,
        /// Track chunks read
        found: usize,
    },
}

#[doc = r#"
A complete MIDI file: the header information and every track.

# Example
```rust
# use midicsv::prelude::*;
let bytes = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x01\xE0\
MTrk\x00\x00\x00\x0D\x00\x90\x3C\x64\x83\x60\x80\x3C\x40\x00\xFF\x2F\x00";

let file = MidiFile::parse(bytes).unwrap();
assert_eq!(file.format_type(), FormatType::SingleMultiChannel);
assert_eq!(file.division().ticks_per_quarter_note(), 480);
assert_eq!(file.tracks()[0].len(), 3);

assert_eq!(file.to_bytes().unwrap(), bytes.to_vec());
```
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiFile {
    header: Header,
    tracks: Vec<Track>,
}

impl MidiFile {
    /// Create a file from its tracks.
    ///
    /// The header's track count is taken from `tracks`.
    pub fn new(
        format: FormatType,
        division: TicksPerQuarterNote,
        tracks: Vec<Track>,
    ) -> Result<Self, FileError> {
        let track_count =
            u16::try_from(tracks.len()).map_err(|_| FileError::TooManyTracks(tracks.len()))?;
        if format == FormatType::SingleMultiChannel && track_count != 1 {
            return Err(FileError::TrackCountMismatch(tracks.len()));
        }
        Ok(Self {
            header: Header::new(format, track_count, division),
            tracks,
        })
    }

    /// A format 1 file holding exactly one track
    pub fn single_track(division: TicksPerQuarterNote, track: Track) -> Self {
        Self {
            header: Header::new(FormatType::Simultaneous, 1, division),
            tracks: alloc::vec![track],
        }
    }

    /// Parse a set of bytes into a file struct.
    ///
    /// Any error aborts the whole parse; no partial file is returned.
    pub fn parse(bytes: &[u8]) -> ReadResult<Self> {
        let mut reader = Reader::from_byte_slice(bytes);
        MidiFileBuilder::default()
            .read(&mut reader)?
            .build()
            .map_err(|k| reader.error(k))
    }

    /// Serialize the file with the default [`WriterConfig`]
    pub fn to_bytes(&self) -> WriteResult<Vec<u8>> {
        MidiWriter::default().write(self)
    }

    /// Serialize the file with the provided configuration
    pub fn to_bytes_with(&self, config: WriterConfig) -> WriteResult<Vec<u8>> {
        MidiWriter::new(config).write(self)
    }

    /// Returns header info
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the format type for the file.
    pub fn format_type(&self) -> FormatType {
        self.header.format_type()
    }

    /// Ticks per quarter note shared by every track
    pub fn division(&self) -> TicksPerQuarterNote {
        self.header.division()
    }

    /// Returns a track list
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Consume the file into its tracks
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

#[test]
fn format_zero_needs_one_track() {
    let division = TicksPerQuarterNote::default();
    assert_eq!(
        MidiFile::new(FormatType::SingleMultiChannel, division, Vec::new()),
        Err(FileError::TrackCountMismatch(0))
    );
    let file = MidiFile::new(FormatType::Simultaneous, division, Vec::new()).unwrap();
    assert_eq!(file.header().track_count(), 0);
}
