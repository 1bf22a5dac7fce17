//! Data models for tagdb.
//!
//! - [`TagValue`] - a single tag field value
//! - [`TagMap`] - the ordered set of fields read from one file

pub mod tag;

pub use tag::{TagMap, TagValue};
