use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub openweather_api_key: String,
    pub openweather_base_url: String,
    pub openweather_current_path: String,
    pub openweather_forecast_path: String,
    pub openweather_units: String,
    pub openweather_timeout_secs: u64,
    pub database_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, applying the same defaults
    /// as `from_env`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let openweather_timeout_secs = match lookup("OPENWEATHER_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("OPENWEATHER_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw)
            })?,
            None => 10,
        };

        Ok(Config {
            openweather_api_key: lookup("OPENWEATHER_API_KEY")
                .ok_or_else(|| anyhow::anyhow!("OPENWEATHER_API_KEY not set"))?,
            openweather_base_url: var_or("OPENWEATHER_BASE_URL", "https://api.openweathermap.org"),
            openweather_current_path: var_or("OPENWEATHER_CURRENT_PATH", "/data/2.5/weather"),
            openweather_forecast_path: var_or("OPENWEATHER_FORECAST_PATH", "/data/2.5/forecast"),
            openweather_units: var_or("OPENWEATHER_UNITS", "imperial"),
            openweather_timeout_secs,
            database_url: var_or("DATABASE_URL", "sqlite:./zip_forecast.db?mode=rwc"),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:8080"),
        })
    }
}
