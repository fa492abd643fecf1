//! Short-lived cache of resolved weather queries, keyed by city.

use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::config::CacheConfig;
use crate::models::WeatherQuery;

const KEY_PREFIX: &str = "WQ:";

/// Cache key for a city: `WQ:` followed by the trimmed, lower-cased name
/// with spaces replaced by underscores.
#[must_use]
pub fn cache_key(city: &str) -> String {
    format!("{KEY_PREFIX}{}", city.trim().to_lowercase().replace(' ', "_"))
}

#[derive(Clone)]
pub struct WeatherCache {
    inner: Cache<String, WeatherQuery>,
}

impl WeatherCache {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(Duration::from_secs(config.ttl_seconds), config.max_capacity)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, city: &str) -> Option<WeatherQuery> {
        let key = cache_key(city);
        let hit = self.inner.get(&key).await;
        debug!(key = %key, hit = hit.is_some(), "Weather cache lookup");
        hit
    }

    /// Stores `query` under its own city, replacing any previous entry.
    pub async fn insert(&self, query: &WeatherQuery) {
        self.inner
            .insert(cache_key(&query.city_name), query.clone())
            .await;
    }
}
