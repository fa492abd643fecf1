//! Domain service for weather lookups and scheduled queries.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::WeatherQuery;

/// Errors specific to weather operations.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("No weather data found for city: {0}")]
    CityNotFound(String),

    #[error("Weather query not found: {0}")]
    QueryNotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Task queue error: {0}")]
    Queue(String),
}

impl From<sea_orm::DbErr> for WeatherError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WeatherError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Current weather for `city`, served from cache when fresh.
    async fn current_weather(&self, city: &str) -> Result<WeatherQuery, WeatherError>;

    /// Records a pending query for `city` and hands it to the worker.
    async fn schedule(&self, city: &str) -> Result<WeatherQuery, WeatherError>;

    /// The query behind `query_id`, in whatever state it is in now.
    async fn get_result(&self, query_id: &str) -> Result<WeatherQuery, WeatherError>;

    /// Most recent queries, newest first.
    async fn history(&self) -> Result<Vec<WeatherQuery>, WeatherError>;
}
