//! Synchronization between audio file tags and the `audio` table.
//!
//! - **Import**: audio files → SQLite, one row per file, columns on demand
//! - **Export**: SQLite → audio files, writing only fields that differ
//! - **Value**: conversion between tag values and stored cells
//! - **Path**: export scoping and file discovery
//!
//! # Example
//!
//! ```ignore
//! use tagdb::sync::{Exporter, FailurePolicy, Importer};
//! use tagdb::tags::AudioCodec;
//!
//! let codec = AudioCodec;
//! let stats = Importer::new(&mut storage, &codec, FailurePolicy::Isolate)?
//!     .import_path(Path::new("/music"))?;
//!
//! let stats = Exporter::new(&storage, &codec).export(Path::new("/music/rock"))?;
//! ```

pub mod export;
pub mod import;
pub mod path;
pub mod types;
pub mod value;

pub use export::Exporter;
pub use import::Importer;
pub use types::{
    ExportOutcome, ExportStats, FailurePolicy, ImportOutcome, ImportStats, SyncError, SyncResult,
};
