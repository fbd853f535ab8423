//! Cache Handle Module
//!
//! Shareable front end of a cache instance. Serializes all operations through a
//! mutex and arms the eviction timer of every written entry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, EntryInfo};
use crate::config::{CacheOptions, SetOptions};
use crate::error::{CacheError, Result};
use crate::tasks::arm_eviction;

// == Cache ==
/// A key-value cache for records and collections of records.
///
/// Cloning the handle shares the same instance. Separately constructed caches
/// are fully independent.
///
/// # Example
/// ```ignore
/// let cache = Cache::new(CacheOptions::default().cache_key("users"))?;
/// cache.set("/users", json!([{ "id": "1", "name": "John" }]), SetOptions::new())?;
/// cache.set("/users/2", json!({ "id": "2", "name": "Jane" }), SetOptions::new())?;
/// assert_eq!(cache.get("/users").unwrap().as_array().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<Mutex<CacheStore>>,
    runtime: Handle,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache that schedules evictions on the current tokio runtime.
    pub fn new(options: CacheOptions) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Self::with_runtime(options, runtime)
    }

    /// Creates a cache that schedules evictions on `runtime`.
    pub fn with_runtime(options: CacheOptions, runtime: Handle) -> Result<Self> {
        let store = CacheStore::new(&options)?;
        info!(
            cache = %options.cache_key,
            "Cache created: entry_key={}, lifetime={}ms, validate={}",
            options.entry_key, options.lifetime, options.validate
        );
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            runtime,
        })
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Set ==
    /// Stores `value` under `key` and (re)arms its eviction.
    ///
    /// Returns `ValidationMismatch` without storing anything when validation is
    /// enabled and the value does not fit the cache.
    pub fn set(&self, key: impl Into<String>, value: Value, options: SetOptions) -> Result<()> {
        let key = key.into();
        let mut store = self.lock();
        let pending = store.set(key.clone(), value, &options)?;
        let timer = arm_eviction(&self.runtime, &self.store, &key, pending.generation, pending.lifetime);
        store.arm(&key, timer);
        Ok(())
    }

    /// Serializes `value` and stores it under `key`.
    pub fn set_from<T: Serialize>(&self, key: impl Into<String>, value: &T, options: SetOptions) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value, options)
    }

    // == Get ==
    /// Returns a copy of the value under `key`, or `None` if it is not cached.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key)
    }

    /// Returns the value under `key` deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(CacheError::from)
    }

    // == Delete ==
    /// Removes `key`, cancelling its eviction. Returns whether it was cached.
    pub fn del(&self, key: &str) -> bool {
        self.lock().del(key)
    }

    // == Flush ==
    /// Removes every entry and resets the hit counter.
    pub fn flush(&self) {
        self.lock().flush();
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    /// Remaining lifetime of `key`.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.lock().ttl(key)
    }

    /// Timestamps, options and eviction state of `key`.
    pub fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        self.lock().entry_info(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
