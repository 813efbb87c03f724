use super::aggregate::ForecastAggregator;
use super::cache::{ForecastCache, StorageError};
use super::types::ForecastEntry;
use super::UpstreamError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const USER_FACING_ERROR: &str = "Unable to retrieve weather data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutcome {
    pub forecast: ForecastEntry,
    pub from_cache: bool,
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Weather fetch failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("Forecast storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl ForecastError {
    /// What the end user sees, regardless of cause.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_ERROR
    }
}

/// Get-or-fetch: serve a fresh cached forecast, otherwise fetch, store and
/// return a new one. Nothing here retries.
///
/// Concurrent misses for the same ZIP each fetch and store their own entry.
#[derive(Clone)]
pub struct ForecastService {
    cache: ForecastCache,
    aggregator: ForecastAggregator,
}

impl ForecastService {
    pub fn new(cache: ForecastCache, aggregator: ForecastAggregator) -> Self {
        Self { cache, aggregator }
    }

    pub async fn get_or_fetch(
        &self,
        zip_code: &str,
        now: DateTime<Utc>,
    ) -> Result<ForecastOutcome, ForecastError> {
        let cached = self.cache.lookup(zip_code, now).await.map_err(|e| {
            tracing::error!(zip_code, error = %e, "Forecast cache lookup failed");
            e
        })?;

        if let Some(forecast) = cached {
            tracing::debug!(zip_code, cached_at = %forecast.cached_at, "Forecast cache hit");
            return Ok(ForecastOutcome {
                forecast,
                from_cache: true,
            });
        }

        tracing::debug!(zip_code, "Forecast cache miss, fetching from upstream");

        let entry = self.aggregator.fetch(zip_code, now).await.map_err(|e| {
            tracing::error!(zip_code, error = %e, "Weather fetch error");
            e
        })?;

        let forecast = self.cache.store(entry).await.map_err(|e| {
            tracing::error!(zip_code, error = %e, "Failed to store fetched forecast, discarding it");
            e
        })?;

        Ok(ForecastOutcome {
            forecast,
            from_cache: false,
        })
    }
}
