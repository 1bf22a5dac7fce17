//! tagdb - audio tags ↔ SQLite sync
//!
//! Imports the tags of every audio file under a directory into one SQLite
//! table, growing a column per distinct field name, and exports edited rows
//! back into the files.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Tag values and field maps
//! - [`tags`] - Tag codecs (ID3v2, Vorbis comments, in-memory)
//! - [`storage`] - SQLite database layer and column registry
//! - [`sync`] - Import and export engines
//! - [`config`] - Log level configuration
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;
pub mod tags;

pub use error::{Error, Result};
