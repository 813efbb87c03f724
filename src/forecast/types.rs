use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One cached forecast for one ZIP code, as of `cached_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub zip_code: String,
    pub current_temperature: f64,
    pub high_temperature: f64,
    pub low_temperature: f64,
    pub description: String,
    pub daily_forecasts: Vec<DailySummary>,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub high_temperature: f64,
    pub low_temperature: f64,
    pub description: String,
}

/// Current conditions as reported by the upstream provider, in °F.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub high_temperature: f64,
    pub low_temperature: f64,
    pub description: String,
}

/// A single 3-hour forecast point.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub description: String,
}

// OpenWeatherMap 2.5 wire format. Only the fields we read are declared.

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherResponse {
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast3hResponse {
    #[serde(default)]
    pub list: Vec<Forecast3hItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast3hItem {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
}
