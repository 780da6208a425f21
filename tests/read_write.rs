use midicsv::prelude::*;
use pretty_assertions::assert_eq;

/// Format 1, two tracks, 96 ticks per quarter note.
///
/// Track 0 holds a tempo, a text meta and a sysex. Track 1 uses running
/// status for its notes and carries a controller, a program change and a
/// pitch bend.
fn two_track_file() -> Vec<u8> {
    let track_0: &[u8] = &[
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo 500000
        0x00, 0xFF, 0x01, 0x04, b'm', b'i', b'd', b'i', // text
        0x00, 0xF0, 0x03, 0x7E, 0x09, 0xF7, // sysex
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let track_1: &[u8] = &[
        0x00, 0xC1, 0x05, // program change
        0x00, 0xB1, 0x07, 0x64, // volume
        0x00, 0x91, 0x3C, 0x64, // note on
        0x00, 0x40, 0x64, // running status note on
        0x60, 0x3C, 0x00, // running status, velocity 0
        0x00, 0x81, 0x40, 0x40, // note off
        0x10, 0xE1, 0x00, 0x40, // pitch bend
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut bytes = b"MThd\x00\x00\x00\x06\x00\x01\x00\x02\x00\x60".to_vec();
    for track in [track_0, track_1] {
        bytes.extend(b"MTrk");
        bytes.extend((track.len() as u32).to_be_bytes());
        bytes.extend(track);
    }
    bytes
}

fn kind(bytes: &[u8]) -> ReaderErrorKind {
    MidiFile::parse(bytes).unwrap_err().error_kind().clone()
}

#[test]
fn parse_two_track_file() {
    let file = MidiFile::parse(&two_track_file()).unwrap();
    assert_eq!(file.format_type(), FormatType::Simultaneous);
    assert_eq!(file.division().ticks_per_quarter_note(), 96);
    assert_eq!(file.tracks().len(), 2);

    let track = &file.tracks()[1];
    assert_eq!(track.len(), 8);
    assert!(track.ends_with_end_of_track());
    assert_eq!(track.end_tick(), 0x70);

    let voice: Vec<&VoiceEvent> = track
        .events()
        .iter()
        .filter_map(|e| e.event().channel_voice())
        .inspect(|msg| assert_eq!(msg.channel(), Channel::Two))
        .map(ChannelVoiceMessage::event)
        .collect();
    assert_eq!(
        voice[..4],
        [
            &VoiceEvent::ProgramChange {
                program: Program::new(5).unwrap()
            },
            &VoiceEvent::ControlChange {
                controller: DataByte::new(7).unwrap(),
                value: DataByte::new(100).unwrap()
            },
            &VoiceEvent::NoteOn {
                key: Key::new(60).unwrap(),
                velocity: Velocity::new(100).unwrap()
            },
            &VoiceEvent::NoteOn {
                key: Key::new(64).unwrap(),
                velocity: Velocity::new(100).unwrap()
            },
        ]
    );
}

#[test]
fn written_bytes_match_running_status_input() {
    let bytes = two_track_file();
    let file = MidiFile::parse(&bytes).unwrap();
    assert_eq!(file.to_bytes().unwrap(), bytes);
}

#[test]
fn read_of_write_is_identity() {
    let file = MidiFile::parse(&two_track_file()).unwrap();
    for running_status in [true, false] {
        let bytes = file.to_bytes_with(WriterConfig { running_status }).unwrap();
        assert_eq!(MidiFile::parse(&bytes).unwrap(), file);
    }
}

#[test]
fn notes_of_parsed_track() {
    let file = MidiFile::parse(&two_track_file()).unwrap();
    assert!(track_to_notes(&file.tracks()[0]).unwrap().is_empty());

    let notes = track_to_notes(&file.tracks()[1]).unwrap();
    let summary: Vec<(u8, u64, u64)> = notes
        .iter()
        .map(|n| (n.key().byte(), n.start_tick(), n.duration_ticks()))
        .collect();
    assert_eq!(summary, [(60, 0, 0x60), (64, 0, 0x60)]);
}

#[test]
fn missing_end_of_track_is_added() {
    let bytes = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x00\x60\
MTrk\x00\x00\x00\x08\x00\x90\x3C\x64\x60\x80\x3C\x40";
    let file = MidiFile::parse(bytes).unwrap();
    let track = &file.tracks()[0];
    assert_eq!(track.len(), 3);
    assert!(track.ends_with_end_of_track());

    let written = file.to_bytes().unwrap();
    assert_eq!(written.len(), bytes.len() + 4);
    assert_eq!(MidiFile::parse(&written).unwrap(), file);
}

#[test]
fn trailing_data_after_last_track_is_ignored() {
    let mut bytes = two_track_file();
    let file = MidiFile::parse(&bytes).unwrap();
    bytes.extend(b"XFIR\x00\x00\x00\x02\x01\x02");
    assert_eq!(MidiFile::parse(&bytes).unwrap(), file);
}

#[test]
fn header_errors() {
    assert!(matches!(
        kind(b"RIFF\x00\x00\x00\x06\x00\x00\x00\x01\x00\x60"),
        ReaderErrorKind::BadMagic { .. }
    ));
    assert_eq!(
        kind(b"MThd\x00\x00\x00\x08\x00\x00\x00\x01\x00\x60\x00\x00"),
        ReaderErrorKind::LengthMismatch { declared: 8 }
    );
    assert_eq!(
        kind(b"MThd\x00\x00\x00\x06\x00\x03\x00\x01\x00\x60"),
        ReaderErrorKind::UnsupportedFormat(3)
    );
    assert_eq!(
        kind(b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\xE7\x28"),
        ReaderErrorKind::UnsupportedTiming(0xE728)
    );
    assert_eq!(kind(b"MThd\x00\x00\x00\x06\x00"), ReaderErrorKind::TruncatedStream);
}

#[test]
fn track_errors_name_the_track() {
    let bytes = two_track_file();

    // cut into the second track
    let err = MidiFile::parse(&bytes[..bytes.len() - 6]).unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(err.track(), Some(1));

    // fewer tracks than declared
    let first_track_end = 14 + 8 + 25;
    let err = MidiFile::parse(&bytes[..first_track_end]).unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(err.track(), Some(1));

    // second chunk id replaced
    let mut bad = bytes.clone();
    bad[first_track_end..first_track_end + 4].copy_from_slice(b"MTrX");
    let err = MidiFile::parse(&bad).unwrap_err();
    assert_eq!(err.position(), first_track_end);
    assert_eq!(err.track(), Some(1));
    assert!(matches!(err.error_kind(), ReaderErrorKind::BadMagic { .. }));
}

#[test]
fn format_zero_with_two_tracks() {
    let mut bytes = b"MThd\x00\x00\x00\x06\x00\x00\x00\x02\x00\x60".to_vec();
    for _ in 0..2 {
        bytes.extend(b"MTrk\x00\x00\x00\x04\x00\xFF\x2F\x00");
    }
    assert_eq!(
        kind(&bytes),
        ReaderErrorKind::File(FileError::TrackCountMismatch(2))
    );
}
