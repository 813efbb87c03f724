use super::types::ForecastEntry;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;

pub const CACHE_TTL_MINUTES: i64 = 30;

pub fn cache_ttl() -> Duration {
    Duration::minutes(CACHE_TTL_MINUTES)
}

/// An entry is fresh while its age is strictly below the TTL.
pub fn is_fresh(cached_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - cached_at < cache_ttl()
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored forecast is unreadable: {0}")]
    Corrupt(String),
}

/// Append-only storage of forecast entries.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    async fn append(&self, entry: &ForecastEntry) -> Result<(), StorageError>;

    /// Entries for `zip_code` with `cached_at` strictly after `since`, in
    /// insertion order.
    async fn recent_for_zip(
        &self,
        zip_code: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ForecastEntry>, StorageError>;
}

#[derive(Clone)]
pub struct ForecastCache {
    store: Arc<dyn ForecastStore>,
}

impl ForecastCache {
    pub fn new(store: Arc<dyn ForecastStore>) -> Self {
        Self { store }
    }

    /// Most recent fresh entry for `zip_code`. On equal `cached_at` the entry
    /// stored last wins.
    pub async fn lookup(
        &self,
        zip_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ForecastEntry>, StorageError> {
        let candidates = self.store.recent_for_zip(zip_code, now - cache_ttl()).await?;

        // max_by_key keeps the last of equal keys
        Ok(candidates
            .into_iter()
            .filter(|entry| is_fresh(entry.cached_at, now))
            .max_by_key(|entry| entry.cached_at))
    }

    pub async fn store(&self, entry: ForecastEntry) -> Result<ForecastEntry, StorageError> {
        self.store.append(&entry).await?;
        tracing::debug!(zip_code = %entry.zip_code, cached_at = %entry.cached_at, "Stored forecast");
        Ok(entry)
    }
}
