#![doc = r#"
File conversions between MIDI and CSV, and merging of MIDI files

Each conversion comes in three shapes:

- an in-memory function over bytes, readers and writers
  ([`midi_to_csv`], [`csv_to_midi`], [`combine_midis`]),
- a path-based function with the default configuration
  ([`convert_midi_to_csv`], [`convert_csv_to_midi`],
  [`convert_and_combine_midi_files`]),
- the same with an explicit [`ConversionConfig`] (`*_with_config`).

Path-based conversions write their output to a temporary sibling and
rename it into place once everything succeeded, so a failed conversion
never leaves a destination file behind.
"#]

use crate::{
    csv_bridge,
    error::{Error, Result},
    prelude::*,
    writer::WriterConfig,
};
use alloc::vec::Vec;
use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

/// Options shared by every conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Division of MIDI files built from CSV (default: 480)
    pub division: TicksPerQuarterNote,
    /// How MIDI output is encoded
    pub writer: WriterConfig,
    /// How notes are paired and laid out
    pub assembler: AssemblerConfig,
    /// How files are merged
    pub merge: MergeConfig,
    /// When combining, also export each input as `<csv_dir>/<stem>.csv`
    pub csv_dir: Option<PathBuf>,
}

/// Pair the notes of every track of `file`, keeping track order.
pub fn file_to_notes(file: &MidiFile, config: &AssemblerConfig) -> Result<Vec<Vec<Note>>> {
    file.tracks()
        .iter()
        .enumerate()
        .map(|(track, t)| {
            track_to_notes_with(t, config).map_err(|source| Error::Note { track, source })
        })
        .collect()
}

/// Build a file from per-track notes.
///
/// The tempo event goes on the first track only. No tracks at all gives a
/// single track holding just the tempo and end-of-track. One track is
/// written as format 0, several as format 1.
pub fn notes_to_file(tracks: &[Vec<Note>], config: &ConversionConfig) -> Result<MidiFile> {
    let without_tempo = AssemblerConfig {
        tempo: None,
        ..config.assembler
    };
    let layout = |track: usize, notes: &[Note]| {
        let assembler = if track == 0 {
            &config.assembler
        } else {
            &without_tempo
        };
        notes_to_track(notes, assembler).map_err(|source| Error::Note { track, source })
    };

    let tracks = match tracks {
        [] => alloc::vec![layout(0, &[])?],
        tracks => tracks
            .iter()
            .enumerate()
            .map(|(track, notes)| layout(track, notes))
            .collect::<Result<Vec<_>>>()?,
    };
    let format = if tracks.len() == 1 {
        FormatType::SingleMultiChannel
    } else {
        FormatType::Simultaneous
    };
    Ok(MidiFile::new(format, config.division, tracks)?)
}

/// Convert MIDI bytes into note rows written to `csv`.
pub fn midi_to_csv<W: io::Write>(midi: &[u8], csv: W, config: &ConversionConfig) -> Result<()> {
    let file = MidiFile::parse(midi)?;
    let tracks = file_to_notes(&file, &config.assembler)?;
    csv_bridge::write_notes(csv, &tracks)?;
    Ok(())
}

/// Convert note rows read from `csv` into MIDI bytes.
pub fn csv_to_midi<R: io::Read>(csv: R, config: &ConversionConfig) -> Result<Vec<u8>> {
    let tracks = csv_bridge::read_notes(csv)?;
    let file = notes_to_file(&tracks, config)?;
    Ok(file.to_bytes_with(config.writer)?)
}

/// Merge several MIDI files, given as bytes, into one single-track file.
///
/// The tracks of each file form one merge input. Every input must pair
/// into notes, so a note that is never released fails the merge.
pub fn combine_midis<I, B>(inputs: I, config: &ConversionConfig) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut merger = TrackMerger::new(config.merge);
    for (index, bytes) in inputs.into_iter().enumerate() {
        let check = || -> Result<MidiFile> {
            let file = MidiFile::parse(bytes.as_ref())?;
            file_to_notes(&file, &config.assembler)?;
            Ok(file)
        };
        merger.push_file(check().map_err(|e| e.in_input(index))?);
    }
    let merged = merger.merge()?;
    Ok(merged.into_file().to_bytes_with(config.writer)?)
}

/// Convert the MIDI file at `midi_path` into a CSV file at `csv_path`.
pub fn convert_midi_to_csv(midi_path: impl AsRef<Path>, csv_path: impl AsRef<Path>) -> Result<()> {
    convert_midi_to_csv_with_config(midi_path, csv_path, &ConversionConfig::default())
}

/// [`convert_midi_to_csv`] with an explicit configuration
pub fn convert_midi_to_csv_with_config(
    midi_path: impl AsRef<Path>,
    csv_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<()> {
    let (midi_path, csv_path) = (midi_path.as_ref(), csv_path.as_ref());
    let midi = read_file(midi_path)?;
    let mut csv: Vec<u8> = Vec::new();
    midi_to_csv(&midi, &mut csv, config)?;
    write_atomic(csv_path, &csv)?;
    tracing::info!(path = %csv_path.display(), "MIDI to CSV conversion complete");
    Ok(())
}

/// Convert the CSV file at `csv_path` into a MIDI file at `midi_path` with
/// the given division.
pub fn convert_csv_to_midi(
    csv_path: impl AsRef<Path>,
    midi_path: impl AsRef<Path>,
    division: TicksPerQuarterNote,
) -> Result<()> {
    let config = ConversionConfig {
        division,
        ..Default::default()
    };
    convert_csv_to_midi_with_config(csv_path, midi_path, &config)
}

/// [`convert_csv_to_midi`] with an explicit configuration, taking the
/// division from [`ConversionConfig::division`]
pub fn convert_csv_to_midi_with_config(
    csv_path: impl AsRef<Path>,
    midi_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<()> {
    let (csv_path, midi_path) = (csv_path.as_ref(), midi_path.as_ref());
    let csv = read_file(csv_path)?;
    let midi = csv_to_midi(csv.as_slice(), config)?;
    write_atomic(midi_path, &midi)?;
    tracing::info!(path = %midi_path.display(), "CSV to MIDI conversion complete");
    Ok(())
}

/// Merge the MIDI files at `midi_paths` into one file at `output_path`.
pub fn convert_and_combine_midi_files<P: AsRef<Path>>(
    midi_paths: &[P],
    output_path: impl AsRef<Path>,
) -> Result<()> {
    convert_and_combine_midi_files_with_config(midi_paths, output_path, &ConversionConfig::default())
}

/// [`convert_and_combine_midi_files`] with an explicit configuration.
///
/// Every input must pair into notes. With [`ConversionConfig::csv_dir`]
/// set, every input is also exported as CSV. Nothing is written unless
/// every input converts and the merge succeeds.
pub fn convert_and_combine_midi_files_with_config<P: AsRef<Path>>(
    midi_paths: &[P],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let mut merger = TrackMerger::new(config.merge);
    let mut exports: Vec<(PathBuf, Vec<u8>)> = Vec::new();

    for (index, path) in midi_paths.iter().enumerate() {
        let path = path.as_ref();
        let parse = || -> Result<MidiFile> { Ok(MidiFile::parse(&read_file(path)?)?) };
        let file = parse().map_err(|e| e.in_input(index))?;
        tracing::debug!(path = %path.display(), tracks = file.tracks().len(), "read input");
        let tracks = file_to_notes(&file, &config.assembler).map_err(|e| e.in_input(index))?;

        if let Some(dir) = &config.csv_dir {
            let mut csv: Vec<u8> = Vec::new();
            csv_bridge::write_notes(&mut csv, &tracks).map_err(|e| Error::from(e).in_input(index))?;
            exports.push((csv_export_path(dir, path), csv));
        }
        merger.push_file(file);
    }

    let midi = merger.merge()?.into_file().to_bytes_with(config.writer)?;

    if let Some(dir) = &config.csv_dir {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    for (csv_path, csv) in exports {
        write_atomic(&csv_path, &csv)?;
        tracing::info!(path = %csv_path.display(), "MIDI to CSV conversion complete");
    }
    write_atomic(output_path, &midi)?;
    tracing::info!(
        path = %output_path.display(),
        inputs = midi_paths.len(),
        "MIDI file created"
    );
    Ok(())
}

fn csv_export_path(dir: &Path, midi_path: &Path) -> PathBuf {
    let mut name = midi_path.file_stem().unwrap_or_default().to_os_string();
    name.push(".csv");
    dir.join(name)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

static PARTIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A sibling of `path` no other write in flight uses
fn partial_path(path: &Path) -> PathBuf {
    let serial = PARTIAL_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(alloc::format!(".{}-{serial}.partial", std::process::id()));
    path.with_file_name(name)
}

/// Write `bytes` next to `path`, then rename over it
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let partial = partial_path(path);

    let written = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, path));
    if let Err(e) = written {
        // the partial file may not exist
        let _ = fs::remove_file(&partial);
        return Err(Error::io(path, e));
    }
    Ok(())
}
