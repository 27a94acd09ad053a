//! cliptrim CLI
//!
//! Command-line front end for the clip editing core: inspect WAV files and
//! apply trim / volume / fade edits offline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use cliptrim::engine::{read_wav, write_wav};
use cliptrim::pipeline::{self, EditRequest};
use cliptrim::selection::SelectionRange;
use cliptrim::Result;

/// cliptrim - offline audio clip editor
#[derive(Parser, Debug)]
#[command(name = "cliptrim")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print facts about a WAV file as JSON
    Inspect {
        /// Input WAV file
        input: PathBuf,
    },

    /// Apply edits to a WAV file and write the result
    Process {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Keep audio starting at this many seconds
        #[arg(long, default_value_t = 0.0)]
        start: f64,

        /// Keep audio up to this many seconds (defaults to the clip end)
        #[arg(long)]
        end: Option<f64>,

        /// Volume adjustment in percent, -100..=200
        #[arg(long, default_value_t = 0)]
        volume: i32,

        /// Fade-in duration in whole seconds, 0..=5
        #[arg(long, default_value_t = 0)]
        fade_in: u32,

        /// Fade-out duration in whole seconds, 0..=5
        #[arg(long, default_value_t = 0)]
        fade_out: u32,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { input } => inspect(&input),
        Commands::Process {
            input,
            output,
            start,
            end,
            volume,
            fade_in,
            fade_out,
        } => process(&input, &output, start, end, volume, fade_in, fade_out),
    }
}

fn inspect(input: &std::path::Path) -> Result<()> {
    let clip = read_wav(input)?;

    let facts = serde_json::json!({
        "file": input.display().to_string(),
        "channels": clip.channels(),
        "sample_rate": clip.sample_rate(),
        "frames": clip.frame_count(),
        "duration_secs": clip.duration_secs(),
        "peak": clip.peak(),
    });
    println!("{}", serde_json::to_string_pretty(&facts)?);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn process(
    input: &std::path::Path,
    output: &std::path::Path,
    start: f64,
    end: Option<f64>,
    volume: i32,
    fade_in: u32,
    fade_out: u32,
) -> Result<()> {
    let clip = read_wav(input)?;
    info!(
        "loaded {}: {:.2}s, {} ch, {} Hz",
        input.display(),
        clip.duration_secs(),
        clip.channels(),
        clip.sample_rate()
    );

    let range = SelectionRange {
        start,
        end: end.unwrap_or_else(|| clip.duration_secs()),
    };
    let wants_trim = start > 0.0 || end.is_some();
    let request = EditRequest::new(wants_trim, volume, fade_in, fade_out);

    let edited = pipeline::apply(&clip, &request, &range);
    write_wav(&edited, output)?;

    println!(
        "Wrote {}: {:.2}s ({} frames)",
        output.display(),
        edited.duration_secs(),
        edited.frame_count()
    );

    Ok(())
}
