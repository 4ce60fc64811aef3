//! Bounce Player - a terminal WAV player with a bouncing amplitude trace.
//!
//! Choose a WAV file, play, pause, resume and loop it while a progress bar
//! tracks the position and a red trace sweeps back and forth across the raw
//! sample bytes.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "bounce")]
#[command(about = "Terminal WAV player with a bouncing amplitude trace")]
#[command(version)]
struct Cli {
    /// WAV file to load and start playing
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    cli::play::handle_play(cli.file.as_deref())
}
