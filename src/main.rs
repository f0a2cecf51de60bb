//! midiroll - Rewrites a MIDI file in place as a quantized piano roll
//!
//! Reads the first track with note-on events, folds it into a 24 note by 128 step grid and
//! overwrites the input file with the grid's 3072 occupancy bytes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Rewrites a MIDI file in place as a quantized piano roll
#[derive(Parser)]
#[command(name = "midiroll")]
#[command(about = "Rewrites a MIDI file in place as a quantized piano roll")]
#[command(version)]
struct Cli {
    /// MIDI file to read and overwrite
    path: PathBuf,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!("Converting {:?}", cli.path);
    let roll = midiroll::convert_file(&cli.path)
        .with_context(|| format!("Failed to convert {:?}", cli.path))?;
    tracing::info!(occupied = roll.occupied(), "Done!");

    Ok(())
}
