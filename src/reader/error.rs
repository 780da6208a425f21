use crate::{FileError, OutOfRange, varlen::VarLenError};
use alloc::string::String;
use thiserror::Error;

#[doc = r#"
A set of errors that can occur while reading bytes into the midi representation
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Reading at position {position}{}, {kind}", track_suffix(.track))]
pub struct ReaderError {
    position: usize,
    track: Option<usize>,
    pub(crate) kind: ReaderErrorKind,
}

fn track_suffix(track: &Option<usize>) -> String {
    match track {
        Some(index) => alloc::format!(" (track {index})"),
        None => String::new(),
    }
}

/// A kind of error that a reader can produce
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// A chunk did not start with the expected four-byte id
    #[error("Expected chunk {}, found {found:?}", String::from_utf8_lossy(.expected))]
    BadMagic {
        /// The id that should have been there
        expected: [u8; 4],
        /// The bytes that were there instead
        found: [u8; 4],
    },
    /// A chunk's declared length does not match its content
    #[error("Chunk declares {declared} bytes, which does not match its content")]
    LengthMismatch {
        /// The length field of the chunk
        declared: u32,
    },
    /// The input ended before a complete structure could be read
    #[error("Stream ended unexpectedly")]
    TruncatedStream,
    /// The header's format word is not 0, 1 or 2
    #[error("Unsupported file format {0}")]
    UnsupportedFormat(u16),
    /// The header's division is zero or uses SMPTE timing
    #[error("Unsupported division {0:#06x}")]
    UnsupportedTiming(u16),
    /// A data byte had its high bit set
    #[error("Data byte {0}")]
    ValueOutOfRange(#[from] OutOfRange),
    /// A data byte appeared where a status byte was required
    #[error("Data byte without a running status")]
    MissingRunningStatus,
    /// A system common or real-time status byte appeared in a track
    #[error("Status byte {0:#04x} is not allowed in a track chunk")]
    InvalidStatus(u8),
    /// The header and tracks do not describe a valid file
    #[error("{0}")]
    File(#[from] FileError),
}

impl From<VarLenError> for ReaderErrorKind {
    fn from(value: VarLenError) -> Self {
        match value {
            VarLenError::TruncatedStream => Self::TruncatedStream,
        }
    }
}

impl ReaderError {
    /// Create a reader error from a position and kind
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self {
            position,
            track: None,
            kind,
        }
    }
    /// Attach the index of the track being read
    pub const fn in_track(mut self, track: Option<usize>) -> Self {
        self.track = track;
        self
    }
    /// True if the input ended unexpectedly
    pub const fn is_truncated(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::TruncatedStream)
    }
    /// Returns the error kind of the reader.
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
    /// Returns the byte offset where the read error occurred.
    pub fn position(&self) -> usize {
        self.position
    }
    /// Returns the index of the track chunk being read, if any
    pub fn track(&self) -> Option<usize> {
        self.track
    }

    /// Create a new out of bounds error
    pub const fn oob(position: usize) -> Self {
        Self::new(position, ReaderErrorKind::TruncatedStream)
    }
}

/// The Read Result type (see [`ReaderError`])
pub type ReadResult<T> = Result<T, ReaderError>;

#[test]
fn display_includes_track() {
    let err = ReaderError::oob(12).in_track(Some(2));
    assert_eq!(
        alloc::format!("{err}"),
        "Reading at position 12 (track 2), Stream ended unexpectedly"
    );
    let err = ReaderError::new(0, ReaderErrorKind::UnsupportedFormat(7));
    assert_eq!(
        alloc::format!("{err}"),
        "Reading at position 0, Unsupported file format 7"
    );
}
