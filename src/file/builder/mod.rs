pub mod chunk;

use super::{FileError, MidiFile};
use crate::{
    file::builder::chunk::{RawHeaderChunk, RawTrackChunk},
    prelude::*,
    reader::{ReadResult, Reader},
};
use alloc::vec::Vec;

/// A parsed chunk handed to a [`MidiFileBuilder`]
pub enum ChunkEvent {
    /// The `MThd` chunk
    Header(RawHeaderChunk),
    /// The decoded events of one `MTrk` chunk
    Track(Vec<TrackEvent>),
}

/// A builder used to create a new [`MidiFile`].
#[derive(Default)]
pub struct MidiFileBuilder {
    header: Option<Header>,
    tracks: Vec<Track>,
}

impl MidiFileBuilder {
    /// Handles a chunk of a midi file.
    pub fn handle_chunk(&mut self, chunk: ChunkEvent) -> Result<(), FileError> {
        match chunk {
            ChunkEvent::Header(h) => {
                if self.header.is_some() {
                    return Err(FileError::DuplicateHeader);
                }
                self.header = Some(h.header());
            }
            ChunkEvent::Track(events) => {
                if self.header.is_none() {
                    return Err(FileError::NoHeader);
                }
                self.tracks.push(Track::new(events));
            }
        }
        Ok(())
    }

    /// Read the header and every declared track from `reader`.
    pub(crate) fn read(mut self, reader: &mut Reader<'_>) -> ReadResult<Self> {
        let header = RawHeaderChunk::read(reader)?;
        let track_count = header.header().track_count();
        self.handle_chunk(ChunkEvent::Header(header))
            .map_err(|k| reader.error(k))?;

        for index in 0..track_count as usize {
            reader.set_track(Some(index));
            let events = RawTrackChunk::read(reader)?.events()?;
            self.handle_chunk(ChunkEvent::Track(events))
                .map_err(|k| reader.error(k))?;
        }
        reader.set_track(None);

        if !reader.is_empty() {
            tracing::debug!(
                bytes = reader.remaining(),
                "Ignoring data after the last track chunk"
            );
        }
        Ok(self)
    }

    /// Attempts to finish the midifile from the provided chunks.
    pub fn build(self) -> Result<MidiFile, FileError> {
        let Some(header) = self.header else {
            return Err(FileError::NoHeader);
        };
        if self.tracks.len() != header.track_count() as usize {
            return Err(FileError::MissingTracks {
                declared: header.track_count(),
                found: self.tracks.len(),
            });
        }
        MidiFile::new(header.format_type(), header.division(), self.tracks)
    }
}

#[test]
fn track_before_header() {
    let mut builder = MidiFileBuilder::default();
    assert_eq!(
        builder.handle_chunk(ChunkEvent::Track(Vec::new())),
        Err(FileError::NoHeader)
    );
}

#[test]
fn builds_declared_tracks() {
    let header = Header::new(
        FormatType::Simultaneous,
        2,
        TicksPerQuarterNote::default(),
    );
    let mut builder = MidiFileBuilder {
        header: Some(header),
        tracks: Vec::new(),
    };
    builder.handle_chunk(ChunkEvent::Track(Vec::new())).unwrap();
    assert_eq!(
        builder.build().unwrap_err(),
        FileError::MissingTracks {
            declared: 2,
            found: 1
        }
    );
}
