//! Cache Store Module
//!
//! Synchronous cache engine: entry map, validation and relation synchronization.
//! Eviction timers are armed by the owning [`Cache`](crate::cache::Cache) handle.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::relation::{dedupe_by_relation, relation_value, synchronize, SyncMode};
use crate::cache::{CacheEntry, CacheStats, EntryInfo, EntryOptions};
use crate::config::{CacheOptions, SetOptions};
use crate::error::{CacheError, Result};
use crate::schema::{Datatype, SchemaModel, ValidationMode, Validator};
use crate::tasks::EvictionTimer;

/// Logs a cache operation when the instance was created with `debug` set.
macro_rules! trace_op {
    ($store:expr, $($arg:tt)+) => {
        if $store.debug {
            tracing::debug!(cache = %$store.cache_key, $($arg)+);
        }
    };
}

// == Pending Eviction ==
/// Eviction the caller must arm for a freshly written entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEviction {
    /// Generation of the written entry
    pub generation: u64,
    /// Delay before the entry expires
    pub lifetime: Duration,
}

// == Cache Store ==
/// Cache storage holding records and collections of records.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Instance identifier
    cache_key: String,
    /// Relation key field
    entry_key: String,
    /// Default lifetime for entries without a custom one
    lifetime: Duration,
    /// Whether writes are checked against datatype and schema
    validate: bool,
    validation_mode: ValidationMode,
    debug: bool,
    /// Classification fixed by the first write
    datatype: Option<Datatype>,
    /// Reference schema fixed by the first non-empty write
    validator: Option<Validator>,
    /// Number of set, get and del calls
    hits: u64,
    /// Next entry generation
    next_generation: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore from construction options.
    ///
    /// Fails on a zero lifetime or an empty relation key. When `original` is
    /// given it seeds the datatype and schema.
    pub fn new(options: &CacheOptions) -> Result<Self> {
        if options.lifetime == 0 {
            return Err(CacheError::InvalidConfig(
                "lifetime must be greater than zero".to_string(),
            ));
        }
        if options.entry_key.is_empty() {
            return Err(CacheError::InvalidConfig(
                "entry key must not be empty".to_string(),
            ));
        }

        let mut store = Self {
            entries: HashMap::new(),
            cache_key: options.cache_key.clone(),
            entry_key: options.entry_key.clone(),
            lifetime: options.lifetime_duration(),
            validate: options.validate,
            validation_mode: options.validation_mode,
            debug: options.debug,
            datatype: None,
            validator: None,
            hits: 0,
            next_generation: 0,
        };
        if let Some(original) = &options.original {
            store.seed(original);
        }
        Ok(store)
    }

    // == Set ==
    /// Stores a record or collection under `key`.
    ///
    /// If validation is enabled and the value does not match the cache's
    /// datatype or schema, nothing is stored and `ValidationMismatch` is
    /// returned. Otherwise any previous entry (and its timer) is replaced, and
    /// a record value is propagated into every collection. A collection keeps
    /// only the first element for each relation key.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - A record, a list of records, or a primitive
    /// * `options` - Custom lifetime and synchronization flags
    pub fn set(&mut self, key: String, mut value: Value, options: &SetOptions) -> Result<PendingEviction> {
        self.hits += 1;

        if self.validate {
            if let Err(err) = self.check(&value) {
                trace_op!(self, "Rejected value for key {}: {}", key, err);
                return Err(err);
            }
        }
        self.seed(&value);

        if let Value::Array(items) = &mut value {
            let removed = dedupe_by_relation(items, &self.entry_key);
            if removed > 0 {
                trace_op!(self, "Dropped {} duplicate elements from {}", removed, key);
            }
        }

        let lifetime = options
            .custom_lifetime
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(self.lifetime);
        let generation = self.next_generation;
        self.next_generation += 1;

        trace_op!(self, "Setting key {} (lifetime {:?})", key, lifetime);
        let entry = CacheEntry::new(value.clone(), EntryOptions::from(options), generation, lifetime);
        self.entries.insert(key, entry);

        if !value.is_array() {
            let relation = relation_value(&value, &self.entry_key);
            if relation.is_none() {
                trace_op!(self, "Record has no {} field, skipping synchronization", self.entry_key);
            }
            let changed = synchronize(
                &mut self.entries,
                &self.entry_key,
                SyncMode::Upsert,
                relation,
                Some(&value),
            );
            trace_op!(self, "Synchronized {} collections", changed);
        }

        Ok(PendingEviction {
            generation,
            lifetime,
        })
    }

    // == Arm ==
    /// Attaches an eviction timer to the entry it was created for.
    ///
    /// A timer for a generation that is no longer stored is cancelled.
    pub fn arm(&mut self, key: &str, timer: EvictionTimer) {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == timer.generation() => entry.arm(timer),
            _ => timer.cancel(),
        }
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.hits += 1;

        match self.entries.get(key) {
            Some(entry) => {
                trace_op!(self, "Retrieving key {}", key);
                Some(entry.payload.clone())
            }
            None => {
                trace_op!(self, "Key {} not found", key);
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key, cancelling its eviction.
    ///
    /// A removed record is also removed from every collection. Returns whether
    /// an entry was removed.
    pub fn del(&mut self, key: &str) -> bool {
        self.hits += 1;
        trace_op!(self, "Deleting key {}", key);

        let Some(entry) = self.entries.remove(key) else {
            return false;
        };

        if !entry.is_collection() {
            let relation = relation_value(&entry.payload, &self.entry_key);
            let changed = synchronize(&mut self.entries, &self.entry_key, SyncMode::Remove, relation, None);
            trace_op!(self, "Removed from {} collections", changed);
        }
        true
    }

    // == Expire ==
    /// Removes `key` if it still holds the entry written as `generation`.
    ///
    /// Called by eviction timers. Does not count as a hit and leaves
    /// collections untouched.
    pub fn expire(&mut self, key: &str, generation: u64) -> bool {
        let current = self.entries.get(key).map(|entry| entry.generation);
        if current != Some(generation) {
            trace_op!(self, "Eviction for {} skipped, entry gone or rewritten", key);
            return false;
        }
        self.entries.remove(key);
        trace_op!(self, "Expired key {}", key);
        true
    }

    // == Flush ==
    /// Removes all entries and resets the hit counter. Datatype and schema are kept.
    pub fn flush(&mut self) {
        trace_op!(self, "Flushing {} entries", self.entries.len());
        self.entries.clear();
        self.hits = 0;
    }

    // == Stats ==
    /// Returns a snapshot of the cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cache_key: self.cache_key.clone(),
            entry_key: self.entry_key.clone(),
            lifetime: self.lifetime.as_millis() as u64,
            datatype: self.datatype,
            schema: self.schema().cloned(),
            count: self.entries.len(),
            hits: self.hits,
        }
    }

    // == TTL ==
    /// Remaining lifetime of `key`. Not counted as a hit.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.get(key).map(CacheEntry::ttl_remaining)
    }

    // == Entry Info ==
    /// Timestamps, options and eviction state of `key`. Not counted as a hit.
    pub fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        self.entries.get(key).map(CacheEntry::info)
    }

    /// Returns the reference schema, if established.
    pub fn schema(&self) -> Option<&SchemaModel> {
        self.validator.as_ref().map(Validator::schema)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fixes datatype and schema from `value` unless already set.
    ///
    /// An empty list fixes the datatype but cannot provide a schema.
    fn seed(&mut self, value: &Value) {
        if self.datatype.is_none() {
            let datatype = Datatype::of(value);
            trace_op!(self, "Setting datatype to {}", datatype);
            self.datatype = Some(datatype);
        }
        if self.validator.is_none() && value.as_array().map_or(true, |items| !items.is_empty()) {
            let validator = Validator::new(value, self.validation_mode);
            trace_op!(self, "Setting schema to {}", validator.schema().canonical());
            self.validator = Some(validator);
        }
    }

    /// Checks `value` against the fixed datatype and schema.
    fn check(&self, value: &Value) -> Result<()> {
        let found = Datatype::of(value);
        if let Some(expected) = self.datatype {
            if found != expected {
                return Err(CacheError::mismatch(
                    &self.cache_key,
                    format!("attempted to assign {} to {} cache", found, expected),
                ));
            }
        }

        let Some(validator) = &self.validator else {
            return Ok(());
        };
        let valid = match value {
            Value::Array(items) => validator.validate_list(items),
            other => validator.validate(other),
        };
        if valid {
            return Ok(());
        }

        let samples: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for (index, sample) in samples.into_iter().enumerate() {
            for mismatch in validator.check(sample) {
                trace_op!(self, "Schema mismatch ({:?}) in item {}: {}", validator.mode(), index, mismatch);
            }
        }
        Err(CacheError::mismatch(
            &self.cache_key,
            format!(
                "{} does not match schema {}",
                SchemaModel::build(value, 0).canonical(),
                validator.schema().canonical()
            ),
        ))
    }
}
