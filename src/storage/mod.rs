//! SQLite storage layer for tagdb.
//!
//! One table, `audio`, holds a row per imported file. Its column set is
//! open-ended: reserved `__` columns are fixed, tag columns are added the
//! first time a field name is seen.
//!
//! # Submodules
//!
//! - [`columns`] - Column registry and on-demand column creation
//! - [`schema`] - Base schema and reserved column names
//! - [`sqlite`] - Main SQLite storage implementation

pub mod columns;
pub mod schema;
pub mod sqlite;

pub use columns::ColumnMap;
pub use sqlite::{MetadataRow, MetadataStore};
