use clap::{Parser, Subcommand};
use midicsv::prelude::*;
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write MIDI without running status
    #[arg(long, global = true)]
    no_running_status: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a MIDI file into a CSV table of notes
    ToCsv {
        /// Path to input MIDI file
        input: PathBuf,
        /// Path to output CSV file
        output: PathBuf,
        /// Fail when a sounding key is struck again
        #[arg(long)]
        strict_retrigger: bool,
    },
    /// Convert a CSV table of notes into a MIDI file
    ToMidi {
        /// Path to input CSV file
        input: PathBuf,
        /// Path to output MIDI file
        output: PathBuf,
        /// Ticks per quarter note
        #[arg(short, long, default_value_t = 480)]
        division: u16,
        /// Microseconds per quarter note; 0 writes no tempo event
        #[arg(short, long, default_value_t = 500_000)]
        tempo: u32,
    },
    /// Merge several MIDI files into one
    Combine {
        /// Paths to input MIDI files
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Path to output MIDI file
        #[arg(short, long)]
        output: PathBuf,
        /// Also export every input as CSV into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        /// Accepted rounding error, in merged ticks, when divisions do not share a small multiple
        #[arg(long, default_value_t = 0)]
        tolerance: u32,
        /// Keep the channels of every input as they are
        #[arg(long)]
        keep_channels: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> midicsv::Result<(), String> {
    let mut config = ConversionConfig {
        writer: WriterConfig {
            running_status: !cli.no_running_status,
        },
        ..Default::default()
    };

    let result = match cli.command {
        Command::ToCsv {
            input,
            output,
            strict_retrigger,
        } => {
            config.assembler.strict_retrigger = strict_retrigger;
            midicsv::convert_midi_to_csv_with_config(input, output, &config)
        }
        Command::ToMidi {
            input,
            output,
            division,
            tempo,
        } => {
            config.division = TicksPerQuarterNote::new(division)
                .ok_or_else(|| format!("division {division} is not in 1..=32767"))?;
            config.assembler.tempo = (tempo > 0).then_some(tempo);
            midicsv::convert_csv_to_midi_with_config(input, output, &config)
        }
        Command::Combine {
            inputs,
            output,
            csv_dir,
            tolerance,
            keep_channels,
        } => {
            config.csv_dir = csv_dir;
            config.merge = MergeConfig {
                rounding_tolerance: tolerance,
                channel_policy: if keep_channels {
                    ChannelPolicy::Keep
                } else {
                    ChannelPolicy::Reassign
                },
            };
            midicsv::convert_and_combine_midi_files_with_config(&inputs, output, &config)
        }
    };
    result.map_err(|e| e.to_string())
}
