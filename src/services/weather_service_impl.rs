//! `SeaORM` implementation of the `WeatherService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::{HISTORY_LIMIT, Store};
use crate::models::{QueryStatus, WeatherQuery, normalize_city};
use crate::services::resolver::WeatherResolver;
use crate::services::weather_service::{WeatherError, WeatherService};
use crate::services::worker::QuerySubmitter;

pub struct SeaOrmWeatherService {
    store: Store,
    resolver: Arc<WeatherResolver>,
    submitter: Arc<dyn QuerySubmitter>,
}

impl SeaOrmWeatherService {
    #[must_use]
    pub fn new(
        store: Store,
        resolver: Arc<WeatherResolver>,
        submitter: Arc<dyn QuerySubmitter>,
    ) -> Self {
        Self {
            store,
            resolver,
            submitter,
        }
    }
}

#[async_trait]
impl WeatherService for SeaOrmWeatherService {
    async fn current_weather(&self, city: &str) -> Result<WeatherQuery, WeatherError> {
        self.resolver.resolve(city).await
    }

    async fn schedule(&self, city: &str) -> Result<WeatherQuery, WeatherError> {
        let city = normalize_city(city);
        let query = self
            .store
            .create_query(&city, QueryStatus::Pending, None)
            .await?;

        self.submitter.submit(&query.query_id)?;
        info!(city = %city, query_id = %query.query_id, "Scheduled weather query");

        Ok(query)
    }

    async fn get_result(&self, query_id: &str) -> Result<WeatherQuery, WeatherError> {
        self.store
            .get_query(query_id)
            .await?
            .ok_or_else(|| WeatherError::QueryNotFound(query_id.to_string()))
    }

    async fn history(&self) -> Result<Vec<WeatherQuery>, WeatherError> {
        Ok(self.store.recent_queries(HISTORY_LIMIT).await?)
    }
}
