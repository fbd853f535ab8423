//! Qache - An in-process key-value cache for structured data
//!
//! Walks through the cache features: relation synchronization between records
//! and collections, schema validation and entry expiry.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qache::{Cache, CacheOptions, SetOptions, ValidationMode};

/// Main entry point for the Qache walkthrough.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load cache options from environment variables
/// 3. Cache a collection and propagate record writes into it
/// 4. Show a rejected write on a validating cache
/// 5. Let a short-lived entry expire
#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = CacheOptions::from_env().cache_key("posts");
    info!(
        "Configuration loaded: entry_key={}, lifetime={}ms, validate={}",
        options.entry_key, options.lifetime, options.validate
    );
    let cache = Cache::new(options).context("creating posts cache")?;

    let posts = json!([
        { "userId": 1, "id": 1, "title": "sunt aut facere", "body": "quia et suscipit" },
        { "userId": 1, "id": 2, "title": "qui est esse", "body": "est rerum tempore" }
    ]);
    cache.set("/posts", posts, SetOptions::new())?;
    cache.set(
        "/posts/3",
        json!({ "userId": 1, "id": 3, "title": "ea molestias", "body": "et iusto sed" }),
        SetOptions::new(),
    )?;
    cache.set(
        "/posts/1",
        json!({ "userId": 1, "id": 1, "title": "updated", "body": "quia et suscipit" }),
        SetOptions::new(),
    )?;
    cache.del("/posts/3");
    info!("Synchronized collection: {}", cache.get("/posts").unwrap_or_default());

    let validating = Cache::new(
        CacheOptions::default()
            .cache_key("validated-posts")
            .validate(ValidationMode::Deep),
    )?;
    validating.set("/posts/1", json!({ "id": 1, "title": "first" }), SetOptions::new())?;
    if let Err(err) = validating.set(
        "/invalid",
        json!({ "id": 4, "description": "missing title" }),
        SetOptions::new(),
    ) {
        warn!("{}", err);
    }

    cache.set(
        "/posts/9",
        json!({ "userId": 2, "id": 9, "title": "short lived", "body": "gone soon" }),
        SetOptions::new().lifetime(50),
    )?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    info!("Short-lived entry cached after expiry: {}", cache.get("/posts/9").is_some());

    info!("Stats: {}", serde_json::to_string_pretty(&cache.stats())?);
    Ok(())
}
