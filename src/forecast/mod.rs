pub mod aggregate;
pub mod cache;
#[cfg(test)]
pub mod mock;
pub mod openweather;
pub mod service;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use types::{CurrentConditions, RawForecastPoint};

pub use aggregate::ForecastAggregator;
pub use cache::ForecastCache;
pub use service::{ForecastError, ForecastOutcome, ForecastService};

/// Failure talking to the upstream weather provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unavailable(String),
    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Source of raw weather data for a ZIP code.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, zip_code: &str) -> Result<CurrentConditions, UpstreamError>;

    async fn forecast(&self, zip_code: &str) -> Result<Vec<RawForecastPoint>, UpstreamError>;
}
