//! Entry Eviction Task
//!
//! One deferred task per cache entry that removes the entry once its lifetime
//! has elapsed.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::cache::CacheStore;

// == Eviction Timer ==
/// Handle to a pending eviction. Dropping it cancels the task.
#[derive(Debug)]
pub struct EvictionTimer {
    generation: u64,
    handle: AbortHandle,
}

impl EvictionTimer {
    /// Generation of the entry this timer was armed for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancels the pending eviction.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for EvictionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a task on `runtime` that expires `key` after `lifetime`.
///
/// The task only holds a weak reference to the store, so it never keeps a
/// dropped cache alive. On firing it removes the key only if the entry still
/// carries `generation`; an entry that was rewritten or deleted is left alone.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `store` - Weak reference to the cache store
/// * `key` - The key to expire
/// * `generation` - Write generation of the entry being armed
/// * `lifetime` - Delay before the entry is removed
pub fn spawn_eviction_task(
    runtime: &Handle,
    store: Weak<Mutex<CacheStore>>,
    key: String,
    generation: u64,
    lifetime: Duration,
) -> EvictionTimer {
    let task = runtime.spawn(async move {
        tokio::time::sleep(lifetime).await;

        let Some(store) = store.upgrade() else {
            return;
        };
        let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
        guard.expire(&key, generation);
    });

    EvictionTimer {
        generation,
        handle: task.abort_handle(),
    }
}

/// Convenience for arming a store that is already shared.
pub fn arm_eviction(
    runtime: &Handle,
    store: &Arc<Mutex<CacheStore>>,
    key: &str,
    generation: u64,
    lifetime: Duration,
) -> EvictionTimer {
    spawn_eviction_task(runtime, Arc::downgrade(store), key.to_string(), generation, lifetime)
}
