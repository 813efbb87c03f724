use super::types::*;
use super::{UpstreamError, WeatherSource};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pulls current conditions and 3-hour points from a [`WeatherSource`] and
/// shapes them into a [`ForecastEntry`] that has not been cached yet.
#[derive(Clone)]
pub struct ForecastAggregator {
    source: Arc<dyn WeatherSource>,
}

impl ForecastAggregator {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    pub async fn fetch_current(&self, zip_code: &str) -> Result<CurrentConditions, UpstreamError> {
        self.source.current(zip_code).await
    }

    pub async fn fetch_extended(&self, zip_code: &str) -> Result<Vec<RawForecastPoint>, UpstreamError> {
        self.source.forecast(zip_code).await
    }

    /// Current conditions are mandatory. The extended forecast is only
    /// requested once they are in hand, and an empty point list still yields
    /// an entry.
    pub async fn fetch(&self, zip_code: &str, now: DateTime<Utc>) -> Result<ForecastEntry, UpstreamError> {
        let current = self.fetch_current(zip_code).await?;
        let points = self.fetch_extended(zip_code).await?;

        if points.is_empty() {
            tracing::warn!(zip_code, "Extended forecast returned no points");
        }

        let daily = aggregate_daily(&points);
        Ok(build_entry(zip_code, &current, daily, now))
    }
}

/// Group points by UTC calendar date. Each day takes the max and min
/// temperature of its points and the description of its first point.
pub fn aggregate_daily(points: &[RawForecastPoint]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for point in points {
        let date = point.timestamp.date_naive();
        days.entry(date)
            .and_modify(|day| {
                day.high_temperature = day.high_temperature.max(point.temperature);
                day.low_temperature = day.low_temperature.min(point.temperature);
            })
            .or_insert_with(|| DailySummary {
                date,
                high_temperature: point.temperature,
                low_temperature: point.temperature,
                description: point.description.clone(),
            });
    }

    days.into_values().collect()
}

pub fn build_entry(
    zip_code: &str,
    current: &CurrentConditions,
    daily_forecasts: Vec<DailySummary>,
    now: DateTime<Utc>,
) -> ForecastEntry {
    ForecastEntry {
        zip_code: zip_code.to_string(),
        current_temperature: current.temperature,
        high_temperature: current.high_temperature,
        low_temperature: current.low_temperature,
        description: current.description.clone(),
        daily_forecasts,
        cached_at: now,
    }
}
