//! Background Tasks Module
//!
//! Contains the deferred tasks a cache schedules on the tokio runtime.
//!
//! # Tasks
//! - Eviction: removes a cache entry once its lifetime has elapsed

mod eviction;

pub use eviction::{arm_eviction, spawn_eviction_task, EvictionTimer};
