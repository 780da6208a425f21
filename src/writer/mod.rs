#![doc = r#"
Serialization of a [`MidiFile`] back into bytes

The writer emits the `MThd` chunk followed by one `MTrk` chunk per
track. Delta times and meta/sysex lengths are variable-length encoded.

Running status is an output optimization: when
[`WriterConfig::running_status`] is set, a channel voice status byte is
omitted if it equals the previous one. Meta and sysex events always
carry their status and reset running status, exactly as the reader
expects.

Every track is closed with an end-of-track event. One is appended when
the track lacks it; an existing one is never duplicated.
"#]

mod error;
pub use error::*;

use crate::{
    OutOfRange,
    file::builder::chunk::{HEADER_CHUNK_ID, HEADER_CHUNK_LEN, TRACK_CHUNK_ID},
    prelude::*,
    varlen,
};
use alloc::vec::Vec;

/// Options for [`MidiWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    /// Omit repeated channel voice status bytes (default: `true`)
    pub running_status: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            running_status: true,
        }
    }
}

/// Writes [`MidiFile`]s as Standard MIDI File bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct MidiWriter {
    config: WriterConfig,
}

impl MidiWriter {
    /// Create a writer with the given configuration
    pub const fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Serialize a whole file
    pub fn write(&self, file: &MidiFile) -> WriteResult<Vec<u8>> {
        let header = file.header();
        let mut out = Vec::new();
        out.extend(HEADER_CHUNK_ID);
        out.extend(HEADER_CHUNK_LEN.to_be_bytes());
        out.extend(header.format_type().word().to_be_bytes());
        out.extend(header.track_count().to_be_bytes());
        out.extend(header.division().to_be_bytes());

        for (index, track) in file.tracks().iter().enumerate() {
            self.write_track_chunk(track, &mut out)
                .map_err(|kind| WriterError::new(Some(index), kind))?;
        }
        Ok(out)
    }

    /// Append one `MTrk` chunk for `track` to `out`
    pub fn write_track_chunk(&self, track: &Track, out: &mut Vec<u8>) -> Result<(), WriterErrorKind> {
        out.extend(TRACK_CHUNK_ID);
        let len_at = out.len();
        out.extend([0; 4]);

        self.write_track_events(track, out)?;

        let len = out.len() - len_at - 4;
        let len = u32::try_from(len).map_err(|_| OutOfRange::new(len as u64, u32::MAX as u64))?;
        out[len_at..len_at + 4].copy_from_slice(&len.to_be_bytes());
        Ok(())
    }

    fn write_track_events(&self, track: &Track, out: &mut Vec<u8>) -> Result<(), WriterErrorKind> {
        let mut running_status: Option<u8> = None;
        let mut closed = false;

        for (index, event) in track.events().iter().enumerate() {
            if closed {
                return Err(WriterErrorKind::EventAfterEndOfTrack { index });
            }
            varlen::encode_into(event.delta_ticks(), out)?;

            match event.event() {
                TrackMessage::ChannelVoice(msg) => {
                    let status = msg.status();
                    if !(self.config.running_status && running_status == Some(status)) {
                        out.push(status);
                    }
                    running_status = Some(status);
                    msg.event().write_data(out);
                }
                TrackMessage::SystemExclusive(sysex) => {
                    running_status = None;
                    out.push(sysex.kind().into());
                    write_payload(sysex.data(), out)?;
                }
                TrackMessage::Meta(meta) => {
                    running_status = None;
                    out.extend([0xFF, meta.kind()]);
                    write_payload(meta.data(), out)?;
                    closed = meta.is_end_of_track();
                }
            }
        }

        if !closed {
            out.extend([0x00, 0xFF, MetaMessage::END_OF_TRACK, 0x00]);
        }
        Ok(())
    }
}

fn write_payload(data: &[u8], out: &mut Vec<u8>) -> Result<(), WriterErrorKind> {
    if data.len() > varlen::MAX_VALUE as usize {
        return Err(OutOfRange::new(data.len() as u64, varlen::MAX_VALUE as u64).into());
    }
    varlen::encode_into(data.len() as u32, out)?;
    out.extend_from_slice(data);
    Ok(())
}
