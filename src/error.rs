//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Cache misses are not errors: `get` returns `None` and `del` returns `false`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The value disagrees with the datatype or schema fixed for the cache
    #[error("Validation mismatch in cache {cache}: {reason}")]
    ValidationMismatch { cache: String, reason: String },

    /// Construction options are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cache was created outside a tokio runtime, so eviction cannot be scheduled
    #[error("No tokio runtime available to schedule evictions")]
    NoRuntime,

    /// Converting between a typed value and its JSON form failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Creates a validation mismatch error for the given cache.
    pub fn mismatch(cache: impl Into<String>, reason: impl Into<String>) -> Self {
        CacheError::ValidationMismatch {
            cache: cache.into(),
            reason: reason.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
