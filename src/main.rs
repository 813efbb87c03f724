use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod database;
mod forecast;
mod routes;
mod utils;

use config::Config;
use database::Database;
use forecast::{openweather::OpenWeatherClient, ForecastAggregator, ForecastCache, ForecastService};
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zip_forecast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize database
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let database = Arc::new(Database::new(pool));
    database.init_tables().await?;

    // Initialize weather client
    let weather_client = Arc::new(OpenWeatherClient::new(config.clone())?);

    let forecast_service = ForecastService::new(
        ForecastCache::new(database.clone()),
        ForecastAggregator::new(weather_client),
    );

    let state = AppState {
        database,
        forecast_service: Arc::new(forecast_service),
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
