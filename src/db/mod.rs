use crate::models::{QueryStatus, WeatherQuery};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::weather_query::generate_query_id;

/// Number of records returned by the history listing.
pub const HISTORY_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn query_repo(&self) -> repositories::weather_query::WeatherQueryRepository {
        repositories::weather_query::WeatherQueryRepository::new(self.conn.clone())
    }

    pub async fn create_query(
        &self,
        city_name: &str,
        status: QueryStatus,
        data: Option<&serde_json::Value>,
    ) -> Result<WeatherQuery> {
        self.query_repo().create(city_name, status, data).await
    }

    pub async fn get_query(&self, query_id: &str) -> Result<Option<WeatherQuery>> {
        self.query_repo().get(query_id).await
    }

    pub async fn complete_query(
        &self,
        query_id: &str,
        data: &serde_json::Value,
    ) -> Result<Option<WeatherQuery>> {
        self.query_repo().complete(query_id, data).await
    }

    pub async fn recent_queries(&self, limit: u64) -> Result<Vec<WeatherQuery>> {
        self.query_repo().recent(limit).await
    }
}
