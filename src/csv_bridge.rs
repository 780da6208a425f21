#![doc = r#"
Notes as CSV rows

One row per note, with a required header row:

```text
track_index,channel,pitch,velocity,start_tick,duration_ticks
0,0,60,100,0,480
```

Every field is a non-negative integer. On import, a missing or
non-integer field, a value outside its range, or a wrong header fails
with [`CsvError::MalformedRow`] carrying the 1-based line number (the
header is line 1). Surrounding whitespace is ignored.

# Example
```rust
# use midicsv::csv_bridge::{read_notes, write_notes};
let csv = "track_index,channel,pitch,velocity,start_tick,duration_ticks\n0,0,60,100,0,480\n";
let tracks = read_notes(csv.as_bytes()).unwrap();
assert_eq!(tracks[0][0].duration_ticks(), 480);

let mut out = Vec::new();
write_notes(&mut out, &tracks).unwrap();
assert_eq!(String::from_utf8(out).unwrap(), csv);
```
"#]

use crate::{OutOfRange, prelude::*};
use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// The column names, in order
pub const HEADER: [&str; 6] = [
    "track_index",
    "channel",
    "pitch",
    "velocity",
    "start_tick",
    "duration_ticks",
];

/// A MIDI header counts at most `u16::MAX` tracks
const MAX_TRACK_INDEX: usize = u16::MAX as usize - 1;

/// An error while reading or writing note rows
#[derive(Debug, Error)]
pub enum CsvError {
    /// A row could not be turned into a note
    #[error("Row {row}: {reason}")]
    MalformedRow {
        /// 1-based line number, the header being line 1
        row: u64,
        /// What was wrong with the row
        reason: String,
    },
    /// The underlying reader or writer failed
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl CsvError {
    fn malformed(row: u64, reason: impl ToString) -> Self {
        Self::MalformedRow {
            row,
            reason: reason.to_string(),
        }
    }

    /// Parse failures become [`CsvError::MalformedRow`]; I/O failures are kept
    fn from_record(row: u64, err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => Self::Csv(err),
            _ => Self::malformed(row, err),
        }
    }
}

/// One CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    /// Index of the track the note belongs to
    pub track_index: usize,
    /// `0..=15`
    pub channel: u8,
    /// `0..=127`
    pub pitch: u8,
    /// `1..=127`
    pub velocity: u8,
    /// Absolute tick of the note-on
    pub start_tick: u64,
    /// Positive length in ticks
    pub duration_ticks: u64,
}

impl NoteRow {
    /// The row for `note` in track `track_index`
    pub fn from_note(track_index: usize, note: &Note) -> Self {
        Self {
            track_index,
            channel: note.channel().index(),
            pitch: note.key().byte(),
            velocity: note.velocity().byte(),
            start_tick: note.start_tick(),
            duration_ticks: note.duration_ticks(),
        }
    }

    /// Check every field and build the note
    pub fn to_note(&self) -> Result<Note, String> {
        if self.track_index > MAX_TRACK_INDEX {
            let err = OutOfRange::new(self.track_index as u64, MAX_TRACK_INDEX as u64);
            return Err(alloc::format!("track_index {err}"));
        }
        let channel = Channel::new(self.channel).map_err(|e| alloc::format!("channel {e}"))?;
        let key = Key::new(self.pitch).map_err(|e| alloc::format!("pitch {e}"))?;
        let velocity =
            Velocity::new(self.velocity).map_err(|e| alloc::format!("velocity {e}"))?;
        Note::new(
            channel,
            key,
            velocity,
            self.start_tick,
            self.duration_ticks,
        )
        .map_err(|e| e.to_string())
    }
}

/// Write the header and one row per note, tracks in order.
pub fn write_notes<W: io::Write>(writer: W, tracks: &[Vec<Note>]) -> Result<(), CsvError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HEADER)?;
    for (track_index, notes) in tracks.iter().enumerate() {
        for note in notes {
            csv.serialize(NoteRow::from_note(track_index, note))?;
        }
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read note rows back into tracks.
///
/// The result holds a track for every index up to the largest one seen;
/// indices without rows are empty. Notes keep their row order.
pub fn read_notes<R: io::Read>(reader: R) -> Result<Vec<Vec<Note>>, CsvError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = csv.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| CsvError::from_record(1, e))?,
        None => return Err(CsvError::malformed(1, "missing header row")),
    };
    if !header.iter().eq(HEADER) {
        return Err(CsvError::malformed(
            1,
            alloc::format!("expected header `{}`", HEADER.join(",")),
        ));
    }
    let header = csv::StringRecord::from(HEADER.to_vec());

    let mut tracks: Vec<Vec<Note>> = Vec::new();
    for (index, record) in records.enumerate() {
        let fallback = index as u64 + 2;
        let record = record.map_err(|e| {
            let row = e.position().map_or(fallback, csv::Position::line);
            CsvError::from_record(row, e)
        })?;
        let row = record.position().map_or(fallback, csv::Position::line);

        let parsed: NoteRow = record
            .deserialize(Some(&header))
            .map_err(|e| CsvError::from_record(row, e))?;
        let note = parsed
            .to_note()
            .map_err(|reason| CsvError::MalformedRow { row, reason })?;

        if tracks.len() <= parsed.track_index {
            tracks.resize_with(parsed.track_index + 1, Vec::new);
        }
        tracks[parsed.track_index].push(note);
    }
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER_LINE: &str = "track_index,channel,pitch,velocity,start_tick,duration_ticks";

    fn note(channel: Channel, key: u8, velocity: u8, start: u64, duration: u64) -> Note {
        Note::new(
            channel,
            Key::new(key).unwrap(),
            Velocity::new(velocity).unwrap(),
            start,
            duration,
        )
        .unwrap()
    }

    fn write_string(tracks: &[Vec<Note>]) -> String {
        let mut out = Vec::new();
        write_notes(&mut out, tracks).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn row_error(csv: &str) -> u64 {
        match read_notes(csv.as_bytes()) {
            Err(CsvError::MalformedRow { row, .. }) => row,
            other => panic!("expected a malformed row, got {other:?}"),
        }
    }

    #[test]
    fn header_is_written_without_notes() {
        assert_eq!(write_string(&[]), alloc::format!("{HEADER_LINE}\n"));
    }

    #[test]
    fn rows_follow_track_order() {
        let tracks = alloc::vec![
            alloc::vec![note(Channel::One, 60, 100, 0, 480)],
            Vec::new(),
            alloc::vec![
                note(Channel::Ten, 36, 127, 0, 10),
                note(Channel::Ten, 38, 90, 240, 10),
            ],
        ];
        assert_eq!(
            write_string(&tracks),
            alloc::format!("{HEADER_LINE}\n0,0,60,100,0,480\n2,9,36,127,0,10\n2,9,38,90,240,10\n")
        );
        // the empty track in between survives
        let read = read_notes(write_string(&tracks).as_bytes()).unwrap();
        assert_eq!(read, tracks);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let csv = " track_index , channel,pitch,velocity,start_tick,duration_ticks\n 1, 2 ,64, 80,  5,7 \n";
        let tracks = read_notes(csv.as_bytes()).unwrap();
        assert_eq!(
            tracks,
            [Vec::new(), alloc::vec![note(Channel::Three, 64, 80, 5, 7)]]
        );
    }

    #[test]
    fn header_is_checked() {
        assert_eq!(row_error(""), 1);
        assert_eq!(row_error("track,channel,pitch,velocity,start,duration\n"), 1);
        assert_eq!(row_error("0,0,60,100,0,480\n"), 1);
    }

    #[test]
    fn bad_rows_report_their_line() {
        let rows = [
            "0,0,60,100,0",
            "0,0,60,100,0,480,1",
            "0,0,sixty,100,0,480",
            "0,-1,60,100,0,480",
            "0,0,60,100,0,1.5",
            "0,16,60,100,0,480",
            "0,0,128,100,0,480",
            "0,0,60,0,0,480",
            "0,0,60,128,0,480",
            "0,0,60,100,0,0",
            "65535,0,60,100,0,480",
        ];
        for bad in rows {
            let csv = alloc::format!("{HEADER_LINE}\n0,0,60,100,0,480\n{bad}\n");
            assert_eq!(row_error(&csv), 3, "row `{bad}`");
        }
    }

    #[test]
    fn range_errors_name_the_field() {
        let csv = alloc::format!("{HEADER_LINE}\n0,16,60,100,0,480\n");
        match read_notes(csv.as_bytes()) {
            Err(CsvError::MalformedRow { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.starts_with("channel"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
