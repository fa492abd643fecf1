use crate::entities::{prelude::*, weather_queries};
use crate::models::weather_query::format_timestamp;
use crate::models::{QueryStatus, WeatherQuery};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

pub struct WeatherQueryRepository {
    conn: DatabaseConnection,
}

impl WeatherQueryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        city_name: &str,
        status: QueryStatus,
        data: Option<&serde_json::Value>,
    ) -> Result<WeatherQuery> {
        let now = format_timestamp(chrono::Utc::now());
        let data_json = data.map(serde_json::to_string).transpose()?;

        let active_model = weather_queries::ActiveModel {
            query_id: Set(generate_query_id()),
            city_name: Set(city_name.to_string()),
            status: Set(status.as_str().to_string()),
            data: Set(data_json),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.conn).await?;
        WeatherQuery::try_from(model)
    }

    pub async fn get(&self, query_id: &str) -> Result<Option<WeatherQuery>> {
        WeatherQueries::find()
            .filter(weather_queries::Column::QueryId.eq(query_id))
            .one(&self.conn)
            .await?
            .map(WeatherQuery::try_from)
            .transpose()
    }

    /// Moves the record to `done` with its payload. Returns `None` when no
    /// record carries `query_id`.
    pub async fn complete(
        &self,
        query_id: &str,
        data: &serde_json::Value,
    ) -> Result<Option<WeatherQuery>> {
        let Some(existing) = WeatherQueries::find()
            .filter(weather_queries::Column::QueryId.eq(query_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: weather_queries::ActiveModel = existing.into();
        active_model.status = Set(QueryStatus::Done.as_str().to_string());
        active_model.data = Set(Some(serde_json::to_string(data)?));
        active_model.updated_at = Set(format_timestamp(chrono::Utc::now()));

        let model = active_model.update(&self.conn).await?;
        WeatherQuery::try_from(model).map(Some)
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<WeatherQuery>> {
        WeatherQueries::find()
            .order_by_desc(weather_queries::Column::CreatedAt)
            .order_by_desc(weather_queries::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(WeatherQuery::try_from)
            .collect()
    }
}

/// Opaque client-facing handle: a v4 UUID as 32 lowercase hex characters.
#[must_use]
pub fn generate_query_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
