use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    database::{AddressRecord, CreateAddress, Database},
    forecast::{ForecastError, ForecastOutcome, ForecastService},
    utils::{validate_address, validate_zip_code, ErrorResponse},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub forecast_service: Arc<ForecastService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub zip: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    #[serde(flatten)]
    pub record: AddressRecord,
    pub full_address: String,
}

#[derive(Debug, Serialize)]
pub struct WeatherForecastResponse {
    pub address: AddressResponse,
    #[serde(flatten)]
    pub outcome: ForecastOutcome,
}

fn forecast_error_response(err: &ForecastError) -> ApiError {
    let (status, code) = match err {
        ForecastError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
        ForecastError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_error"),
    };
    (status, Json(ErrorResponse::new(err.user_message(), code)))
}

fn validation_error_response(errors: Vec<String>) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::new("Invalid request", "validation_error").with_errors(errors)),
    )
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.database.health_check().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            "unavailable".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        database,
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<ForecastOutcome>, ApiError> {
    validate_zip_code(&params.zip).map_err(|e| validation_error_response(vec![e]))?;

    state
        .forecast_service
        .get_or_fetch(params.zip.trim(), chrono::Utc::now())
        .await
        .map(Json)
        .map_err(|e| forecast_error_response(&e))
}

pub async fn create_weather_forecast(
    State(state): State<AppState>,
    Json(request): Json<CreateAddress>,
) -> Result<Json<WeatherForecastResponse>, ApiError> {
    validate_address(&request).map_err(validation_error_response)?;

    let record = state.database.create_address(request).await.map_err(|e| {
        tracing::error!("Failed to save address: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                crate::forecast::service::USER_FACING_ERROR,
                "storage_error",
            )),
        )
    })?;

    let outcome = state
        .forecast_service
        .get_or_fetch(&record.zip_code, chrono::Utc::now())
        .await
        .map_err(|e| forecast_error_response(&e))?;

    let full_address = record.full_address();
    Ok(Json(WeatherForecastResponse {
        address: AddressResponse {
            record,
            full_address,
        },
        outcome,
    }))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/forecast", get(get_forecast))
        .route("/weather_forecast", post(create_weather_forecast))
        .with_state(state)
}
