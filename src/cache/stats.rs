//! Cache Statistics Module
//!
//! Read-only snapshot of a cache instance.

use serde::Serialize;

use crate::schema::{Datatype, SchemaModel};

// == Cache Stats ==
/// Details about a cache instance at the time of the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Instance identifier
    pub cache_key: String,
    /// Relation key field
    pub entry_key: String,
    /// Default entry lifetime in milliseconds
    pub lifetime: u64,
    /// Datatype fixed by the first write, if any
    pub datatype: Option<Datatype>,
    /// Reference schema, if one has been established
    pub schema: Option<SchemaModel>,
    /// Current number of entries
    pub count: usize,
    /// Number of set, get and del calls since creation or the last flush
    pub hits: u64,
}
