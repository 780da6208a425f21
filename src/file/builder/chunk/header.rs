use super::{HEADER_CHUNK_ID, read_chunk_header};
use crate::{
    prelude::*,
    reader::{ReadResult, Reader, ReaderErrorKind},
};

/// The length of every header chunk payload
pub const HEADER_CHUNK_LEN: u32 = 6;

/// The parsed `MThd` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeaderChunk {
    header: Header,
}

impl RawHeaderChunk {
    /// Read the header chunk at the reader's position
    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let len = read_chunk_header(reader, HEADER_CHUNK_ID)?;
        if len != HEADER_CHUNK_LEN {
            return Err(reader.error_at(
                reader.buffer_position() - 4,
                ReaderErrorKind::LengthMismatch { declared: len },
            ));
        }

        let format_at = reader.buffer_position();
        let format_word = reader.read_u16()?;
        let format = FormatType::from_word(format_word).ok_or_else(|| {
            reader.error_at(format_at, ReaderErrorKind::UnsupportedFormat(format_word))
        })?;

        let track_count = reader.read_u16()?;

        let division_at = reader.buffer_position();
        let division_word = reader.read_u16()?;
        let division = TicksPerQuarterNote::new(division_word).ok_or_else(|| {
            reader.error_at(division_at, ReaderErrorKind::UnsupportedTiming(division_word))
        })?;

        Ok(Self {
            header: Header::new(format, track_count, division),
        })
    }

    /// The decoded header
    pub const fn header(&self) -> Header {
        self.header
    }
}
