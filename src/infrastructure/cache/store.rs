//! SQLite-backed response cache.
//!
//! One table, one writer. Hit/miss counters live in atomics so `stats()` is
//! cheap and callers can share the store behind a reference.

use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::models::CacheStats;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS llm_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// Keyed response cache over a local SQLite file.
#[derive(Debug)]
pub struct CacheStore {
    pool: SqlitePool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStore {
    /// Open (or create) the cache database at `path`, creating parent
    /// directories as needed.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating cache directory {}", parent.display()))?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options).await
    }

    /// In-memory cache for tests and dry runs.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options =
            SqliteConnectOptions::from_str("sqlite::memory:").context("in-memory cache options")?;
        Self::with_options(options).await
    }

    async fn with_options(options: SqliteConnectOptions) -> anyhow::Result<Self> {
        // Single connection: the pipeline is the only writer, and an
        // in-memory database would otherwise vanish between connections.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("opening cache database")?;
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("creating cache schema")?;
        Ok(Self {
            pool,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Look up a cached value, recording the hit or miss.
    pub async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM llm_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("cache lookup")?;
        match row {
            Some((value,)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(value))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Insert or replace a cached value.
    pub async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT OR REPLACE INTO llm_cache (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .context("cache insert")?;
        Ok(())
    }

    /// Delete every entry, returning how many were removed.
    pub async fn clear(&self) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM llm_cache")
            .execute(&self.pool)
            .await
            .context("cache clear")?;
        let removed = result.rows_affected();
        debug!(removed, "cache cleared");
        Ok(removed)
    }

    /// Number of entries currently stored.
    pub async fn entry_count(&self) -> anyhow::Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM llm_cache")
            .fetch_one(&self.pool)
            .await
            .context("cache count")?;
        Ok(count.unsigned_abs())
    }

    /// Hit/miss counters for this store instance.
    pub fn stats(&self) -> CacheStats {
        CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
