use crate::{
    FileError, csv_bridge::CsvError, merge::MergeError, note::NoteError, reader::ReaderError,
    writer::WriterError,
};
use alloc::boxed::Box;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Any error a conversion can end with
#[derive(Debug, Error)]
pub enum Error {
    /// The MIDI input is malformed
    #[error(transparent)]
    Read(#[from] ReaderError),
    /// The MIDI output could not be encoded
    #[error(transparent)]
    Write(#[from] WriterError),
    /// Notes of a track could not be paired or laid out
    #[error("Track {track}: {source}")]
    Note {
        /// Index of the track
        track: usize,
        /// What went wrong
        #[source]
        source: NoteError,
    },
    /// The inputs could not be merged
    #[error(transparent)]
    Merge(#[from] MergeError),
    /// The CSV input is malformed or could not be written
    #[error(transparent)]
    Csv(#[from] CsvError),
    /// The tracks do not make a valid file
    #[error(transparent)]
    File(#[from] FileError),
    /// One of several inputs failed
    #[error("Input {index}: {source}")]
    Input {
        /// Position of the input in the list
        index: usize,
        /// What went wrong with it
        #[source]
        source: Box<Error>,
    },
    /// A file could not be read or written
    #[error("{}: {source}", path.display())]
    Io {
        /// The file involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn in_input(self, index: usize) -> Self {
        Self::Input {
            index,
            source: Box::new(self),
        }
    }

    /// The reader error behind this error, looking through [`Error::Input`]
    pub fn reader_error(&self) -> Option<&ReaderError> {
        match self {
            Error::Read(err) => Some(err),
            Error::Input { source, .. } => source.reader_error(),
            _ => None,
        }
    }
}

/// Result alias for conversions (see [`Error`])
pub type Result<T, E = Error> = core::result::Result<T, E>;
