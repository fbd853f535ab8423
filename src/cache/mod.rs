//! Cache Module
//!
//! Provides an in-memory cache of records and collections with TTL eviction,
//! schema validation and relation synchronization.

mod entry;
mod handle;
mod relation;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, EntryInfo, EntryOptions};
pub use handle::Cache;
pub use relation::{dedupe_by_relation, relation_value, synchronize, SyncMode};
pub use stats::CacheStats;
pub use store::{CacheStore, PendingEviction};
