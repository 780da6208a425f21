#![doc = r#"
Contains types for MIDI file chunks

# Overview

MIDI files are organized into chunks, each identified by a 4-character ASCII type identifier
followed by a 32-bit big-endian length field and then the chunk data. The length counts
the payload only, not the 8-byte chunk header.

## [`RawHeaderChunk`]

The header chunk (identified by "MThd") must be the first chunk in a MIDI file. This chunk
type contains meta information about the MIDI file, such as:

- [`FormatType`](crate::prelude::FormatType), which identifies how tracks should be played
  (single track, simultaneous tracks, or independent tracks)
- the number of track chunks that follow
- [`TicksPerQuarterNote`](crate::prelude::TicksPerQuarterNote), which defines how delta-ticks
  are to be interpreted

The header chunk always has a fixed length of 6 bytes.

## [`RawTrackChunk`]

Track chunks (identified by "MTrk") contain the actual MIDI events and timing information.
Their payload is a sequence of [`TrackEvent`](crate::prelude::TrackEvent)s, each a
delta-time followed by the event data, closed by an end-of-track meta event.

# Example Structure

```text
[Header Chunk: "MThd"]
[Track Chunk 1: "MTrk"]
[Track Chunk 2: "MTrk"]
...
[Track Chunk N: "MTrk"]
```
"#]

mod header;
pub use header::*;

mod track;
pub use track::*;

use crate::reader::{ReadResult, Reader, ReaderErrorKind};

/// The id of the header chunk
pub const HEADER_CHUNK_ID: [u8; 4] = *b"MThd";
/// The id of a track chunk
pub const TRACK_CHUNK_ID: [u8; 4] = *b"MTrk";

/// Read a chunk id and its length, checking the id against `expected`.
pub(crate) fn read_chunk_header(reader: &mut Reader<'_>, expected: [u8; 4]) -> ReadResult<u32> {
    let start = reader.buffer_position();
    let found = reader.read_exact_size::<4>()?;
    if found != expected {
        return Err(reader.error_at(start, ReaderErrorKind::BadMagic { expected, found }));
    }
    reader.read_u32()
}
