#![doc = r#"
A cursor over the bytes of a MIDI file

[`Reader`] tracks the current offset and the track chunk being read, so
every [`ReaderError`] it produces points at the offending byte. Most
users call [`MidiFile::parse`](crate::prelude::MidiFile::parse) instead.
"#]

mod error;
pub use error::*;

use crate::varlen;

/// A position-tracking reader over a byte slice.
///
/// A reader can be narrowed to the payload of one chunk with
/// [`Reader::chunk`]; positions stay relative to the whole file.
#[derive(Debug)]
pub struct Reader<'slc> {
    data: &'slc [u8],
    position: usize,
    base: usize,
    track: Option<usize>,
}

impl<'slc> Reader<'slc> {
    /// Create a reader over the full input
    pub const fn from_byte_slice(data: &'slc [u8]) -> Self {
        Self {
            data,
            position: 0,
            base: 0,
            track: None,
        }
    }

    /// The offset of the next byte, from the start of the file
    pub const fn buffer_position(&self) -> usize {
        self.base + self.position
    }

    /// The number of unread bytes
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// True if every byte has been read
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn set_track(&mut self, track: Option<usize>) {
        self.track = track;
    }

    pub(crate) fn track(&self) -> Option<usize> {
        self.track
    }

    /// An error of `kind` at the current position
    pub(crate) fn error(&self, kind: impl Into<ReaderErrorKind>) -> ReaderError {
        self.error_at(self.buffer_position(), kind)
    }

    /// An error of `kind` at an absolute file offset
    pub(crate) fn error_at(&self, position: usize, kind: impl Into<ReaderErrorKind>) -> ReaderError {
        ReaderError::new(position, kind.into()).in_track(self.track)
    }

    /// Peek at the next byte without consuming it
    pub(crate) fn peek_u8(&self) -> ReadResult<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| self.error(ReaderErrorKind::TruncatedStream))
    }

    pub(crate) fn read_u8(&mut self) -> ReadResult<u8> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Ok(byte)
    }

    pub(crate) fn read_slice(&mut self, len: usize) -> ReadResult<&'slc [u8]> {
        if len > self.remaining() {
            return Err(self.error(ReaderErrorKind::TruncatedStream));
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    pub(crate) fn read_exact_size<const SIZE: usize>(&mut self) -> ReadResult<[u8; SIZE]> {
        let slice = self.read_slice(SIZE)?;
        let mut bytes = [0; SIZE];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }

    pub(crate) fn read_u16(&mut self) -> ReadResult<u16> {
        self.read_exact_size().map(u16::from_be_bytes)
    }

    pub(crate) fn read_u32(&mut self) -> ReadResult<u32> {
        self.read_exact_size().map(u32::from_be_bytes)
    }

    /// Read a variable-length quantity
    pub(crate) fn read_varlen(&mut self) -> ReadResult<u32> {
        let (value, consumed) =
            varlen::decode(self.data, self.position).map_err(|e| self.error(e))?;
        self.position += consumed;
        Ok(value)
    }

    /// Split off the next `len` bytes as a reader of their own.
    pub(crate) fn chunk(&mut self, len: usize) -> ReadResult<Reader<'slc>> {
        let base = self.buffer_position();
        let data = self.read_slice(len)?;
        Ok(Reader {
            data,
            position: 0,
            base,
            track: self.track,
        })
    }
}
