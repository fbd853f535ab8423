//! Qache - An in-process key-value cache for structured data
//!
//! Stores records and lists of records, keeps lists consistent with the records
//! they contain, and optionally validates every value against one schema.

pub mod cache;
pub mod config;
pub mod error;
pub mod schema;
pub mod tasks;

pub use cache::{Cache, CacheStats, EntryInfo};
pub use config::{CacheOptions, SetOptions};
pub use error::{CacheError, Result};
pub use schema::{Datatype, SchemaKind, SchemaModel, ValidationMode, Validator};
