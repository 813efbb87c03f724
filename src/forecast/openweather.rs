use super::types::*;
use super::{UpstreamError, WeatherSource};
use crate::config::Config;
use crate::utils::truncate_body;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("API error: HTTP {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Invalid forecast timestamp: {0}")]
    InvalidTimestamp(i64),
}

impl From<OpenWeatherError> for UpstreamError {
    fn from(err: OpenWeatherError) -> Self {
        match err {
            OpenWeatherError::RequestFailed(e) => UpstreamError::Unavailable(e.to_string()),
            OpenWeatherError::ApiError { status, body } => UpstreamError::Status {
                status,
                message: body,
            },
            e @ (OpenWeatherError::JsonParsing(_) | OpenWeatherError::InvalidTimestamp(_)) => {
                UpstreamError::Malformed(e.to_string())
            }
        }
    }
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("ZipForecast/0.1")
            .timeout(Duration::from_secs(config.openweather_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn get_current(&self, zip_code: &str) -> Result<CurrentWeatherResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_current_path
        );

        self.make_request(&url, zip_code).await
    }

    pub async fn get_forecast3h(&self, zip_code: &str) -> Result<Forecast3hResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_forecast_path
        );

        self.make_request(&url, zip_code).await
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        url: &str,
        zip_code: &str,
    ) -> Result<T, OpenWeatherError> {
        let response = self
            .client
            .get(url)
            .query(&[
                ("zip", zip_code),
                ("units", self.config.openweather_units.as_str()),
                ("appid", self.config.openweather_api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OpenWeatherError::ApiError {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        tracing::debug!(zip_code, url, "OpenWeather responded with {}", status);
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, zip_code: &str) -> Result<CurrentConditions, UpstreamError> {
        let response = self.get_current(zip_code).await?;
        Ok(CurrentConditions::from(&response))
    }

    async fn forecast(&self, zip_code: &str) -> Result<Vec<RawForecastPoint>, UpstreamError> {
        let response = self.get_forecast3h(zip_code).await?;
        let points = response
            .list
            .iter()
            .map(RawForecastPoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(points)
    }
}

fn first_description(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

// Convert OpenWeather data to internal format
impl From<&CurrentWeatherResponse> for CurrentConditions {
    fn from(response: &CurrentWeatherResponse) -> Self {
        Self {
            temperature: response.main.temp,
            high_temperature: response.main.temp_max.unwrap_or(response.main.temp),
            low_temperature: response.main.temp_min.unwrap_or(response.main.temp),
            description: first_description(&response.weather),
        }
    }
}

impl TryFrom<&Forecast3hItem> for RawForecastPoint {
    type Error = OpenWeatherError;

    fn try_from(item: &Forecast3hItem) -> Result<Self, Self::Error> {
        let timestamp = chrono::DateTime::from_timestamp(item.dt, 0)
            .ok_or(OpenWeatherError::InvalidTimestamp(item.dt))?;

        Ok(Self {
            timestamp,
            temperature: item.main.temp,
            description: first_description(&item.weather),
        })
    }
}
