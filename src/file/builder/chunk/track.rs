use super::{TRACK_CHUNK_ID, read_chunk_header};
use crate::{
    prelude::*,
    reader::{ReadResult, Reader, ReaderErrorKind},
};
use alloc::vec::Vec;

/// An `MTrk` chunk whose payload has not been decoded yet
pub struct RawTrackChunk<'slc> {
    declared: u32,
    payload: Reader<'slc>,
}

impl<'slc> RawTrackChunk<'slc> {
    /// Read the track chunk header and split off its payload.
    ///
    /// Fails with [`ReaderErrorKind::TruncatedStream`] if the declared
    /// length runs past the end of the input.
    pub(crate) fn read(reader: &mut Reader<'slc>) -> ReadResult<Self> {
        let declared = read_chunk_header(reader, TRACK_CHUNK_ID)?;
        let payload = reader.chunk(declared as usize)?;
        Ok(Self { declared, payload })
    }

    /// The length field of the chunk
    pub const fn len(&self) -> u32 {
        self.declared
    }

    /// True if the chunk has no payload
    pub const fn is_empty(&self) -> bool {
        self.declared == 0
    }

    /// Decode every event in the payload.
    ///
    /// An event that runs past the end of the payload, or any byte after
    /// the end-of-track event, is a [`ReaderErrorKind::LengthMismatch`].
    pub fn events(self) -> ReadResult<Vec<TrackEvent>> {
        let declared = self.declared;
        let mut reader = self.payload;
        let mut events = Vec::new();
        let mut running_status: Option<u8> = None;

        while !reader.is_empty() {
            if events.last().is_some_and(|e: &TrackEvent| e.event().is_end_of_track()) {
                return Err(reader.error(ReaderErrorKind::LengthMismatch { declared }));
            }
            let event = read_event(&mut reader, &mut running_status).map_err(|e| {
                if e.is_truncated() {
                    reader.error(ReaderErrorKind::LengthMismatch { declared })
                } else {
                    e
                }
            })?;
            events.push(event);
        }

        if !events.last().is_some_and(|e| e.event().is_end_of_track()) {
            tracing::warn!(
                track = reader.track(),
                "Track chunk has no end-of-track event; appending one"
            );
            events.push(TrackEvent::new(0, MetaMessage::end_of_track()));
        }
        Ok(events)
    }
}

/// Read one delta time and event.
///
/// `running_status` holds the last channel voice status byte; meta and
/// sysex events clear it.
fn read_event(reader: &mut Reader<'_>, running_status: &mut Option<u8>) -> ReadResult<TrackEvent> {
    let delta_ticks = reader.read_varlen()?;
    let status_at = reader.buffer_position();
    let status = reader.peek_u8()?;

    let message = match status {
        0xFF => {
            reader.read_u8()?;
            *running_status = None;
            let kind = reader.read_u8()?;
            let len = reader.read_varlen()?;
            let data = reader.read_slice(len as usize)?;
            TrackMessage::Meta(MetaMessage::new(kind, data))
        }
        0xF0 | 0xF7 => {
            reader.read_u8()?;
            *running_status = None;
            let kind = SysExKind::try_from(status)
                .map_err(|_| reader.error_at(status_at, ReaderErrorKind::InvalidStatus(status)))?;
            let len = reader.read_varlen()?;
            let data = reader.read_slice(len as usize)?;
            TrackMessage::SystemExclusive(SystemExclusiveMessage::new(kind, data))
        }
        0xF1..=0xFE => {
            return Err(reader.error_at(status_at, ReaderErrorKind::InvalidStatus(status)));
        }
        0x80..=0xEF => {
            reader.read_u8()?;
            *running_status = Some(status);
            read_voice_message(reader, status)?
        }
        _ => {
            let Some(status) = *running_status else {
                return Err(reader.error_at(status_at, ReaderErrorKind::MissingRunningStatus));
            };
            read_voice_message(reader, status)?
        }
    };

    Ok(TrackEvent::new(delta_ticks, message))
}

fn read_voice_message(reader: &mut Reader<'_>, status: u8) -> ReadResult<TrackMessage> {
    let first = read_data_byte(reader)?;
    let second = match VoiceEvent::data_len(status) {
        1 => DataByte::default(),
        _ => read_data_byte(reader)?,
    };
    Ok(TrackMessage::ChannelVoice(ChannelVoiceMessage::new(
        Channel::from_status(status),
        VoiceEvent::from_status(status, first, second),
    )))
}

fn read_data_byte(reader: &mut Reader<'_>) -> ReadResult<DataByte> {
    let at = reader.buffer_position();
    let byte = reader.read_u8()?;
    DataByte::new(byte).map_err(|e| reader.error_at(at, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(payload: &[u8]) -> alloc::vec::Vec<u8> {
        let mut bytes = b"MTrk".to_vec();
        bytes.extend((payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn parse(bytes: &[u8]) -> ReadResult<Vec<TrackEvent>> {
        let mut reader = Reader::from_byte_slice(bytes);
        RawTrackChunk::read(&mut reader)?.events()
    }

    fn note(delta: u32, status: u8, key: u8, velocity: u8) -> TrackEvent {
        TrackEvent::new(
            delta,
            ChannelVoiceMessage::new(
                Channel::from_status(status),
                VoiceEvent::from_status(
                    status,
                    DataByte::new(key).unwrap(),
                    DataByte::new(velocity).unwrap(),
                ),
            ),
        )
    }

    #[test]
    fn running_status_reuses_previous_status() {
        let bytes = chunk(&[
            0x00, 0x91, 0x3C, 0x64, // note on, explicit
            0x00, 0x40, 0x64, // note on, running
            0x83, 0x60, 0x3C, 0x00, // velocity 0, running
            0x00, 0xFF, 0x2F, 0x00,
        ]);
        let events = parse(&bytes).unwrap();
        assert_eq!(
            events,
            [
                note(0, 0x91, 0x3C, 0x64),
                note(0, 0x91, 0x40, 0x64),
                note(480, 0x91, 0x3C, 0x00),
                TrackEvent::new(0, MetaMessage::end_of_track()),
            ]
        );
    }

    #[test]
    fn meta_resets_running_status() {
        let bytes = chunk(&[
            0x00, 0x90, 0x3C, 0x64, //
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, //
            0x00, 0x3C, 0x00,
        ]);
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.error_kind(), &ReaderErrorKind::MissingRunningStatus);
        assert_eq!(err.position(), 8 + 12);
    }

    #[test]
    fn program_change_has_one_data_byte() {
        let bytes = chunk(&[0x00, 0xC2, 0x05, 0x10, 0x07, 0x00, 0xFF, 0x2F, 0x00]);
        let events = parse(&bytes).unwrap();
        let program = |p| {
            TrackEvent::new(
                0,
                ChannelVoiceMessage::new(
                    Channel::Three,
                    VoiceEvent::ProgramChange {
                        program: Program::new(p).unwrap(),
                    },
                ),
            )
        };
        let second = TrackEvent::new(0x10, program(7).into_event());
        assert_eq!(events[..2], [program(5), second]);
    }

    #[test]
    fn sysex_is_kept_opaque() {
        let bytes = chunk(&[0x00, 0xF0, 0x03, 0x43, 0x12, 0xF7, 0x00, 0xFF, 0x2F, 0x00]);
        let events = parse(&bytes).unwrap();
        assert_eq!(
            events[0],
            TrackEvent::new(
                0,
                SystemExclusiveMessage::new(SysExKind::Start, [0x43, 0x12, 0xF7])
            )
        );
    }

    #[test]
    fn missing_end_of_track_is_appended() {
        let bytes = chunk(&[0x00, 0x90, 0x3C, 0x64]);
        let events = parse(&bytes).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[1].event().is_end_of_track());
    }

    #[test]
    fn bytes_after_end_of_track() {
        let bytes = chunk(&[0x00, 0xFF, 0x2F, 0x00, 0x00]);
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.error_kind(), &ReaderErrorKind::LengthMismatch { declared: 5 });
    }

    #[test]
    fn event_crossing_chunk_end() {
        // declared length cuts the note on in half; the remaining bytes exist in the file
        let mut bytes = chunk(&[0x00, 0x90, 0x3C]);
        bytes.extend([0x64, 0x00, 0xFF, 0x2F, 0x00]);
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.error_kind(), &ReaderErrorKind::LengthMismatch { declared: 3 });
    }

    #[test]
    fn declared_length_past_end_of_input() {
        let mut bytes = chunk(&[0x00, 0xFF, 0x2F, 0x00]);
        bytes.truncate(bytes.len() - 2);
        let err = parse(&bytes).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn data_byte_with_high_bit() {
        let bytes = chunk(&[0x00, 0x90, 0x3C, 0xE4, 0x00, 0xFF, 0x2F, 0x00]);
        let err = parse(&bytes).unwrap_err();
        assert_eq!(
            err.error_kind(),
            &ReaderErrorKind::ValueOutOfRange(OutOfRange::new(0xE4, 0x7F))
        );
        assert_eq!(err.position(), 8 + 3);
    }

    #[test]
    fn real_time_status_is_invalid() {
        let bytes = chunk(&[0x00, 0xF8, 0x00, 0xFF, 0x2F, 0x00]);
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.error_kind(), &ReaderErrorKind::InvalidStatus(0xF8));
    }

    #[test]
    fn track_chunk_bad_magic() {
        let err = parse(b"MTrx\x00\x00\x00\x00").unwrap_err();
        assert!(matches!(err.error_kind(), ReaderErrorKind::BadMagic { .. }));
    }
}
