//! CLI definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::LogLevel;

pub mod commands;

/// Sync action to run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Read tags from audio files into the database
    Import,
    /// Write tags from the database back to audio files
    Export,
}

/// tagdb - keep audio file tags and a SQLite table in sync
#[derive(Parser, Debug)]
#[command(name = "tagdb", author, version, about, long_about = None)]
pub struct Cli {
    /// Action to run
    #[arg(value_enum)]
    pub action: Action,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Music directory (or single file) to import from or export to
    pub music_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL")]
    pub log: Option<LogLevel>,

    /// Output the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Export only: report changes without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Import only: stop at the first file that cannot be stored
    #[arg(long)]
    pub fail_fast: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
