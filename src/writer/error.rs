use crate::OutOfRange;
use alloc::string::String;
use thiserror::Error;

/// An error produced while serializing a [`MidiFile`](crate::prelude::MidiFile)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Writing{}, {kind}", track_suffix(.track))]
pub struct WriterError {
    track: Option<usize>,
    pub(crate) kind: WriterErrorKind,
}

fn track_suffix(track: &Option<usize>) -> String {
    match track {
        Some(index) => alloc::format!(" track {index}"),
        None => String::new(),
    }
}

/// A kind of error that the writer can produce
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriterErrorKind {
    /// A delta time, payload length or chunk length is too large for its field
    #[error("Value {0}")]
    ValueOutOfRange(#[from] OutOfRange),
    /// An end-of-track meta event is followed by more events
    #[error("End of track is followed by event {index}")]
    EventAfterEndOfTrack {
        /// Index of the first event after end-of-track
        index: usize,
    },
}

impl WriterError {
    /// Create a new writer error
    pub const fn new(track: Option<usize>, kind: WriterErrorKind) -> Self {
        Self { track, kind }
    }
    /// The track being written when the error occurred
    pub const fn track(&self) -> Option<usize> {
        self.track
    }
    /// The kind of error
    pub const fn error_kind(&self) -> &WriterErrorKind {
        &self.kind
    }
}

/// The Write Result type (see [`WriterError`])
pub type WriteResult<T> = Result<T, WriterError>;
