//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with eviction metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::time::Instant;

use crate::config::SetOptions;
use crate::tasks::EvictionTimer;

// == Entry Options ==
/// Relation synchronization flags captured when the entry was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    pub ignore_create: bool,
    pub ignore_update: bool,
    pub ignore_delete: bool,
}

impl From<&SetOptions> for EntryOptions {
    fn from(options: &SetOptions) -> Self {
        Self {
            ignore_create: options.ignore_create,
            ignore_update: options.ignore_update,
            ignore_delete: options.ignore_delete,
        }
    }
}

// == Entry Info ==
/// Read-only metadata of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Remaining time before eviction
    pub ttl: Duration,
    pub options: EntryOptions,
    /// Whether an eviction timer is attached
    pub eviction_pending: bool,
}

// == Cache Entry ==
/// A single cached record or collection with its metadata.
#[derive(Debug)]
pub struct CacheEntry {
    /// The stored value
    pub payload: Value,
    /// Synchronization flags for collections
    pub options: EntryOptions,
    /// Write generation, matched by the eviction timer before removing
    pub generation: u64,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
    /// When the payload last changed, by a write or by synchronization
    pub updated_at: DateTime<Utc>,
    /// When the eviction timer is due
    pub expires_at: Instant,
    /// Pending eviction; dropping it cancels the timer
    eviction: Option<EvictionTimer>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry due for eviction after `lifetime`.
    pub fn new(payload: Value, options: EntryOptions, generation: u64, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            payload,
            options,
            generation,
            created_at: now,
            updated_at: now,
            expires_at: Instant::now() + lifetime,
            eviction: None,
        }
    }

    /// Whether the payload is a collection.
    pub fn is_collection(&self) -> bool {
        self.payload.is_array()
    }

    /// Attaches the eviction timer, cancelling any previous one.
    pub fn arm(&mut self, timer: EvictionTimer) {
        if let Some(previous) = self.eviction.replace(timer) {
            previous.cancel();
        }
    }

    /// Whether an eviction timer is attached.
    pub fn is_armed(&self) -> bool {
        self.eviction.is_some()
    }

    /// Marks the payload as changed.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Snapshot of the entry metadata.
    pub fn info(&self) -> EntryInfo {
        EntryInfo {
            created_at: self.created_at,
            updated_at: self.updated_at,
            ttl: self.ttl_remaining(),
            options: self.options,
            eviction_pending: self.is_armed(),
        }
    }

    /// Remaining time before eviction, zero once due.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
