use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::forecast::cache::{ForecastStore, StorageError};
use crate::forecast::types::{DailySummary, ForecastEntry};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] sqlx::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DatabaseError> for StorageError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionFailed(e) => StorageError::Unavailable(e.to_string()),
            DatabaseError::InvalidData(msg) => StorageError::Corrupt(msg),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AddressRecord {
    pub id: Uuid,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
}

impl AddressRecord {
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address, self.city, self.state, self.zip_code
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddress {
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

// Daily forecasts live in `forecast_data` as JSON. `cached_at` is written as
// fixed-width RFC 3339 so text order matches time order.
#[derive(Debug, sqlx::FromRow)]
struct ForecastRow {
    zip_code: String,
    current_temperature: f64,
    high_temperature: f64,
    low_temperature: f64,
    description: String,
    forecast_data: String,
    cached_at: String,
}

impl TryFrom<ForecastRow> for ForecastEntry {
    type Error = DatabaseError;

    fn try_from(row: ForecastRow) -> Result<Self, Self::Error> {
        let daily_forecasts: Vec<DailySummary> = serde_json::from_str(&row.forecast_data)
            .map_err(|e| DatabaseError::InvalidData(format!("forecast_data: {}", e)))?;
        let cached_at = DateTime::parse_from_rfc3339(&row.cached_at)
            .map_err(|e| DatabaseError::InvalidData(format!("cached_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(ForecastEntry {
            zip_code: row.zip_code,
            current_temperature: row.current_temperature,
            high_temperature: row.high_temperature,
            low_temperature: row.low_temperature,
            description: row.description,
            daily_forecasts,
            cached_at,
        })
    }
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_tables(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather_forecasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                zip_code TEXT NOT NULL,
                current_temperature REAL NOT NULL,
                high_temperature REAL NOT NULL,
                low_temperature REAL NOT NULL,
                description TEXT NOT NULL,
                forecast_data TEXT NOT NULL DEFAULT '[]',
                cached_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS addresses (
                id TEXT PRIMARY KEY,
                street_address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                zip_code TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_weather_forecasts_zip_cached_at ON weather_forecasts(zip_code, cached_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_forecast(&self, entry: &ForecastEntry) -> Result<(), DatabaseError> {
        let forecast_data = serde_json::to_string(&entry.daily_forecasts)
            .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO weather_forecasts (
                zip_code, current_temperature, high_temperature, low_temperature,
                description, forecast_data, cached_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&entry.zip_code)
        .bind(entry.current_temperature)
        .bind(entry.high_temperature)
        .bind(entry.low_temperature)
        .bind(&entry.description)
        .bind(forecast_data)
        .bind(encode_timestamp(entry.cached_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_forecasts_since(
        &self,
        zip_code: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ForecastEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, ForecastRow>(
            r#"
            SELECT zip_code, current_temperature, high_temperature, low_temperature,
                   description, forecast_data, cached_at
            FROM weather_forecasts
            WHERE zip_code = $1 AND cached_at > $2
            ORDER BY cached_at ASC, id ASC
            "#,
        )
        .bind(zip_code)
        .bind(encode_timestamp(since))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ForecastEntry::try_from).collect()
    }

    pub async fn create_address(&self, address: CreateAddress) -> Result<AddressRecord, DatabaseError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let result = sqlx::query_as::<_, AddressRecord>(
            r#"
            INSERT INTO addresses (id, street_address, city, state, zip_code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(address.street_address.trim())
        .bind(address.city.trim())
        .bind(address.state.trim())
        .bind(address.zip_code.trim())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ForecastStore for Database {
    async fn append(&self, entry: &ForecastEntry) -> Result<(), StorageError> {
        Ok(self.insert_forecast(entry).await?)
    }

    async fn recent_for_zip(
        &self,
        zip_code: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ForecastEntry>, StorageError> {
        Ok(self.get_forecasts_since(zip_code, since).await?)
    }
}

// In-memory store for tests
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryStore {
    entries: std::sync::Arc<tokio::sync::RwLock<Vec<ForecastEntry>>>,
}

#[cfg(test)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
#[async_trait]
impl ForecastStore for InMemoryStore {
    async fn append(&self, entry: &ForecastEntry) -> Result<(), StorageError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn recent_for_zip(
        &self,
        zip_code: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ForecastEntry>, StorageError> {
        let entries = self.entries.read().await;

        Ok(entries
            .iter()
            .filter(|e| e.zip_code == zip_code && e.cached_at > since)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_database() -> Database {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let database = Database::new(pool);
        database.init_tables().await.unwrap();
        database
    }

    fn sample_entry(cached_at: DateTime<Utc>) -> ForecastEntry {
        ForecastEntry {
            zip_code: "78701".to_string(),
            current_temperature: 75.2,
            high_temperature: 85.1,
            low_temperature: 65.3,
            description: "partly cloudy".to_string(),
            daily_forecasts: vec![
                DailySummary {
                    date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                    high_temperature: 82.0,
                    low_temperature: 80.0,
                    description: "sunny".to_string(),
                },
                DailySummary {
                    date: NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(),
                    high_temperature: 60.0,
                    low_temperature: 58.0,
                    description: "light rain".to_string(),
                },
            ],
            cached_at,
        }
    }

    #[tokio::test]
    async fn test_forecast_survives_storage() {
        let database = memory_database().await;
        let cached_at = Utc::now();
        let entry = sample_entry(cached_at);

        database.append(&entry).await.unwrap();
        let found = database
            .recent_for_zip("78701", cached_at - Duration::minutes(30))
            .await
            .unwrap();

        assert_eq!(found, vec![entry]);
    }

    #[tokio::test]
    async fn test_recent_for_zip_filters_and_orders() {
        let database = memory_database().await;
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        database.append(&sample_entry(now - Duration::minutes(5))).await.unwrap();
        database.append(&sample_entry(now - Duration::minutes(40))).await.unwrap();
        database
            .append(&sample_entry(now - Duration::minutes(20) + Duration::milliseconds(250)))
            .await
            .unwrap();
        let mut other_zip = sample_entry(now);
        other_zip.zip_code = "67890".to_string();
        database.append(&other_zip).await.unwrap();

        let found = database
            .recent_for_zip("78701", now - Duration::minutes(30))
            .await
            .unwrap();

        let times: Vec<_> = found.iter().map(|e| e.cached_at).collect();
        assert_eq!(
            times,
            vec![
                now - Duration::minutes(20) + Duration::milliseconds(250),
                now - Duration::minutes(5)
            ]
        );
    }

    #[tokio::test]
    async fn test_corrupt_forecast_data_is_reported() {
        let database = memory_database().await;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO weather_forecasts (zip_code, current_temperature, high_temperature, low_temperature, description, forecast_data, cached_at) VALUES ('78701', 1.0, 2.0, 0.0, 'x', 'not json', $1)",
        )
        .bind(encode_timestamp(now))
        .execute(&database.pool)
        .await
        .unwrap();

        let err = database
            .recent_for_zip("78701", now - Duration::minutes(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_create_address() {
        let database = memory_database().await;

        let record = database
            .create_address(CreateAddress {
                street_address: " 123 Main St ".to_string(),
                city: "Austin".to_string(),
                state: "TX".to_string(),
                zip_code: "78701".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(record.full_address(), "123 Main St, Austin, TX 78701");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses")
            .fetch_one(&database.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(database.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let database = memory_database().await;
        database.pool.close().await;

        let err = database.append(&sample_entry(Utc::now())).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
