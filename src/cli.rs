use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sub_overlay::formats::CaptionFormat;

#[derive(Debug, Parser)]
#[command(name = "subov")]
#[command(about = "Import, edit, and play back caption overlays.")]
pub struct Args {
    /// Path to config TOML (defaults to ./config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a caption file to SRT or the native JSON document
    Convert(ConvertCmd),
    /// Play a caption file against a simulated clock and print what is shown
    Play(PlayCmd),
    /// Apply JSON edit batches to a caption file
    Edit(EditCmd),
    /// Compress a raw caption file for storage
    Pack(PackCmd),
    /// Restore a packed raw caption file
    Unpack(UnpackCmd),
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Parser)]
pub struct ConvertCmd {
    /// Input file path, or '-' for stdin
    pub input: String,

    /// Output file path (optional)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Target format (srt or json)
    #[arg(long, value_enum)]
    pub to: CaptionFormat,

    /// Force input format (otherwise inferred from extension or content)
    #[arg(long, value_enum)]
    pub from: Option<CaptionFormat>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Allow overwriting output file
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Parser)]
pub struct PlayCmd {
    /// Input file path, or '-' for stdin
    pub input: String,

    #[arg(long, value_enum)]
    pub from: Option<CaptionFormat>,

    /// Seek here before playing
    #[arg(long, default_value_t = 0)]
    pub start_ms: i64,

    /// Stop here (defaults to the end of the last cue)
    #[arg(long)]
    pub end_ms: Option<i64>,

    /// Clock step per tick (overrides playback.step_ms)
    #[arg(long)]
    pub step_ms: Option<i64>,
}

#[derive(Debug, Parser)]
pub struct EditCmd {
    /// Input file path, or '-' for stdin
    pub input: String,

    #[arg(long, value_enum)]
    pub from: Option<CaptionFormat>,

    /// JSON file holding a list of edit batches
    #[arg(long)]
    pub actions: PathBuf,

    /// Undo this many steps after applying the batches
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Output file path (native JSON)
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long)]
    pub stdout: bool,

    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Parser)]
pub struct PackCmd {
    pub input: String,

    #[arg(short, long)]
    pub output: String,

    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Parser)]
pub struct UnpackCmd {
    pub input: String,

    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long)]
    pub stdout: bool,

    #[arg(long)]
    pub overwrite: bool,
}
