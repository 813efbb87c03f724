use super::types::*;
use super::{UpstreamError, WeatherSource};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Weather source that replays canned responses and counts calls.
pub struct ScriptedWeatherSource {
    current: Result<CurrentConditions, UpstreamError>,
    forecast: Result<Vec<RawForecastPoint>, UpstreamError>,
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
}

impl ScriptedWeatherSource {
    pub fn new(
        current: Result<CurrentConditions, UpstreamError>,
        forecast: Result<Vec<RawForecastPoint>, UpstreamError>,
    ) -> Self {
        Self {
            current,
            forecast,
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
        }
    }

    /// Austin, TX: partly cloudy now, two forecast days.
    pub fn austin() -> Self {
        let day1 = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap();
        let hours = chrono::Duration::hours(3);

        Self::new(
            Ok(CurrentConditions {
                temperature: 75.2,
                high_temperature: 85.1,
                low_temperature: 65.3,
                description: "partly cloudy".to_string(),
            }),
            Ok(vec![
                RawForecastPoint { timestamp: day1, temperature: 80.0, description: "sunny".to_string() },
                RawForecastPoint { timestamp: day1 + hours, temperature: 82.0, description: "few clouds".to_string() },
                RawForecastPoint { timestamp: day2, temperature: 58.0, description: "light rain".to_string() },
                RawForecastPoint { timestamp: day2 + hours, temperature: 60.0, description: "overcast".to_string() },
            ]),
        )
    }

    pub fn failing_current() -> Self {
        Self::new(
            Err(UpstreamError::Status {
                status: 401,
                message: "Invalid API key".to_string(),
            }),
            Ok(Vec::new()),
        )
    }

    pub fn with_points(mut self, points: Vec<RawForecastPoint>) -> Self {
        self.forecast = Ok(points);
        self
    }

    pub fn with_forecast_error(mut self, err: UpstreamError) -> Self {
        self.forecast = Err(err);
        self
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for ScriptedWeatherSource {
    async fn current(&self, _zip_code: &str) -> Result<CurrentConditions, UpstreamError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.current.clone()
    }

    async fn forecast(&self, _zip_code: &str) -> Result<Vec<RawForecastPoint>, UpstreamError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.forecast.clone()
    }
}
