//! Configuration Module
//!
//! Construction options for a cache instance and per-call write options.

use std::env;
use std::time::Duration;

use serde_json::Value;

use crate::schema::ValidationMode;

/// Default entry lifetime in milliseconds (5 minutes)
pub const DEFAULT_LIFETIME_MS: u64 = 1000 * 60 * 5;

/// Cache construction options.
///
/// All values have sensible defaults and can be loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Identifies the instance in logs and stats
    pub cache_key: String,
    /// Field name used to correlate records with collection elements
    pub entry_key: String,
    /// Default entry lifetime in milliseconds
    pub lifetime: u64,
    /// Whether writes are checked against the datatype and schema
    pub validate: bool,
    /// How schemas are compared when validating
    pub validation_mode: ValidationMode,
    /// Emits a debug event for every cache operation
    pub debug: bool,
    /// Sample value seeding datatype and schema before the first write
    pub original: Option<Value>,
}

impl CacheOptions {
    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_KEY` - Instance identifier (default: "default")
    /// - `CACHE_ENTRY_KEY` - Relation key field (default: "id")
    /// - `CACHE_LIFETIME_MS` - Entry lifetime in milliseconds (default: 300000)
    /// - `CACHE_VALIDATE` - Enable validation (default: false)
    /// - `CACHE_VALIDATION_MODE` - `quick` or `deep` (default: quick)
    /// - `CACHE_DEBUG` - Enable operation logging (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates options from an arbitrary variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            cache_key: lookup("CACHE_KEY").unwrap_or(defaults.cache_key),
            entry_key: lookup("CACHE_ENTRY_KEY").unwrap_or(defaults.entry_key),
            lifetime: lookup("CACHE_LIFETIME_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lifetime),
            validate: lookup("CACHE_VALIDATE")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.validate),
            validation_mode: lookup("CACHE_VALIDATION_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.validation_mode),
            debug: lookup("CACHE_DEBUG")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.debug),
            original: None,
        }
    }

    /// Sets the instance identifier.
    pub fn cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    /// Sets the relation key field.
    pub fn entry_key(mut self, entry_key: impl Into<String>) -> Self {
        self.entry_key = entry_key.into();
        self
    }

    /// Sets the default lifetime in milliseconds.
    pub fn lifetime(mut self, lifetime_ms: u64) -> Self {
        self.lifetime = lifetime_ms;
        self
    }

    /// Enables validation with the given mode.
    pub fn validate(mut self, mode: ValidationMode) -> Self {
        self.validate = true;
        self.validation_mode = mode;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Seeds datatype and schema from a sample value.
    pub fn original(mut self, original: Value) -> Self {
        self.original = Some(original);
        self
    }

    /// Default lifetime as a Duration.
    pub fn lifetime_duration(&self) -> Duration {
        Duration::from_millis(self.lifetime)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            cache_key: "default".to_string(),
            entry_key: "id".to_string(),
            lifetime: DEFAULT_LIFETIME_MS,
            validate: false,
            validation_mode: ValidationMode::Quick,
            debug: false,
            original: None,
        }
    }
}

/// Per-call options for `set`.
///
/// The ignore flags apply when the written entry is a collection and later
/// acts as a target of relation synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Lifetime in milliseconds overriding the instance default
    pub custom_lifetime: Option<u64>,
    /// Do not append records that are not yet in the collection
    pub ignore_create: bool,
    /// Do not replace elements when their record is rewritten
    pub ignore_update: bool,
    /// Do not remove elements when their record is deleted
    pub ignore_delete: bool,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifetime(mut self, lifetime_ms: u64) -> Self {
        self.custom_lifetime = Some(lifetime_ms);
        self
    }

    pub fn ignore_create(mut self) -> Self {
        self.ignore_create = true;
        self
    }

    pub fn ignore_update(mut self) -> Self {
        self.ignore_update = true;
        self
    }

    pub fn ignore_delete(mut self) -> Self {
        self.ignore_delete = true;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_options_default() {
        let options = CacheOptions::default();
        assert_eq!(options.cache_key, "default");
        assert_eq!(options.entry_key, "id");
        assert_eq!(options.lifetime, 300_000);
        assert!(!options.validate);
        assert_eq!(options.validation_mode, ValidationMode::Quick);
        assert!(!options.debug);
        assert!(options.original.is_none());
    }

    #[test]
    fn test_options_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_KEY");
        env::remove_var("CACHE_ENTRY_KEY");
        env::remove_var("CACHE_LIFETIME_MS");
        env::remove_var("CACHE_VALIDATE");
        env::remove_var("CACHE_VALIDATION_MODE");
        env::remove_var("CACHE_DEBUG");

        let options = CacheOptions::from_env();
        assert_eq!(options.cache_key, "default");
        assert_eq!(options.entry_key, "id");
        assert_eq!(options.lifetime, DEFAULT_LIFETIME_MS);
        assert!(!options.validate);
    }

    #[test]
    fn test_options_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CACHE_KEY", "posts"),
            ("CACHE_ENTRY_KEY", "uuid"),
            ("CACHE_LIFETIME_MS", "1500"),
            ("CACHE_VALIDATE", "true"),
            ("CACHE_VALIDATION_MODE", "deep"),
            ("CACHE_DEBUG", "1"),
        ]
        .into_iter()
        .collect();

        let options = CacheOptions::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(options.cache_key, "posts");
        assert_eq!(options.entry_key, "uuid");
        assert_eq!(options.lifetime, 1500);
        assert!(options.validate);
        assert_eq!(options.validation_mode, ValidationMode::Deep);
        assert!(options.debug);
    }

    #[test]
    fn test_options_from_lookup_ignores_garbage() {
        let options = CacheOptions::from_lookup(|name| match name {
            "CACHE_LIFETIME_MS" => Some("soon".to_string()),
            "CACHE_VALIDATE" => Some("maybe".to_string()),
            "CACHE_VALIDATION_MODE" => Some("thorough".to_string()),
            _ => None,
        });
        assert_eq!(options.lifetime, DEFAULT_LIFETIME_MS);
        assert!(!options.validate);
        assert_eq!(options.validation_mode, ValidationMode::Quick);
    }

    #[test]
    fn test_set_options_builders() {
        let options = SetOptions::new().lifetime(10).ignore_create().ignore_delete();
        assert_eq!(options.custom_lifetime, Some(10));
        assert!(options.ignore_create);
        assert!(!options.ignore_update);
        assert!(options.ignore_delete);
    }
}
