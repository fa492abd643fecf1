use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::WeatherProvider;
use crate::db::Store;
use crate::models::{QueryStatus, WeatherQuery, normalize_city};
use crate::services::cache::WeatherCache;
use crate::services::weather_service::WeatherError;

/// Cache-then-upstream lookup shared by the synchronous endpoint and the
/// scheduled query worker.
pub struct WeatherResolver {
    store: Store,
    provider: Arc<dyn WeatherProvider>,
    cache: WeatherCache,
}

impl WeatherResolver {
    #[must_use]
    pub fn new(store: Store, provider: Arc<dyn WeatherProvider>, cache: WeatherCache) -> Self {
        Self {
            store,
            provider,
            cache,
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Returns the cached query for `city`, or geocodes it, fetches current
    /// conditions, stores a `done` record and caches it.
    ///
    /// Concurrent misses for the same city are not coalesced; each one calls
    /// upstream and writes its own record.
    pub async fn resolve(&self, city: &str) -> Result<WeatherQuery, WeatherError> {
        let city = normalize_city(city);

        if let Some(cached) = self.cache.get(&city).await {
            debug!(city = %city, query_id = %cached.query_id, "Serving weather from cache");
            return Ok(cached);
        }

        let data = self
            .fetch_current(&city)
            .await
            .ok_or_else(|| WeatherError::CityNotFound(city.clone()))?;

        let query = self
            .store
            .create_query(&city, QueryStatus::Done, Some(&data))
            .await?;
        self.cache.insert(&query).await;

        info!(city = %city, query_id = %query.query_id, "Resolved current weather");
        Ok(query)
    }

    /// Completes a pending query created by the schedule endpoint.
    ///
    /// Returns `Ok(None)` when upstream could not provide data. The record is
    /// left `pending` in that case.
    pub async fn complete_scheduled(
        &self,
        query_id: &str,
    ) -> Result<Option<WeatherQuery>, WeatherError> {
        let query = self
            .store
            .get_query(query_id)
            .await?
            .ok_or_else(|| WeatherError::QueryNotFound(query_id.to_string()))?;

        if !query.is_pending() {
            debug!(query_id, status = %query.status, "Query already processed");
            return Ok(Some(query));
        }

        let city = normalize_city(&query.city_name);
        let Some(data) = self.fetch_current(&city).await else {
            warn!(query_id, city = %city, "No weather data for scheduled query");
            return Ok(None);
        };

        let Some(done) = self.store.complete_query(query_id, &data).await? else {
            return Err(WeatherError::QueryNotFound(query_id.to_string()));
        };
        self.cache.insert(&done).await;

        Ok(Some(done))
    }

    /// Geocodes `city` and fetches its current conditions.
    async fn fetch_current(&self, city: &str) -> Option<serde_json::Value> {
        let Some(coords) = self.provider.lookup(city).await else {
            debug!(city, "City could not be geocoded");
            return None;
        };

        self.provider.fetch(coords).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Coordinates;
    use crate::config::CacheConfig;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        lookups: AtomicUsize,
        fetches: AtomicUsize,
        known_city: Option<&'static str>,
        fetch_fails: bool,
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn lookup(&self, city: &str) -> Option<Coordinates> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            (self.known_city == Some(city)).then_some(Coordinates {
                lat: 48.85,
                lon: 2.35,
            })
        }

        async fn fetch(&self, _coords: Coordinates) -> Option<serde_json::Value> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            (!self.fetch_fails).then(|| json!({"weather": [{"main": "Clear"}]}))
        }
    }

    async fn resolver_with(provider: Arc<CountingProvider>) -> (WeatherResolver, Store) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let cache = WeatherCache::new(&CacheConfig::default());
        (WeatherResolver::new(store.clone(), provider, cache), store)
    }

    #[tokio::test]
    async fn test_second_resolve_is_served_from_cache() {
        let provider = Arc::new(CountingProvider {
            known_city: Some("paris"),
            ..Default::default()
        });
        let (resolver, store) = resolver_with(provider.clone()).await;

        let first = resolver.resolve("Paris").await.unwrap();
        let second = resolver.resolve("  PARIS ").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.city_name, "paris");
        assert_eq!(first.status, QueryStatus::Done);
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(store.recent_queries(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_city_writes_nothing() {
        let provider = Arc::new(CountingProvider::default());
        let (resolver, store) = resolver_with(provider.clone()).await;

        let err = resolver.resolve("Atlantis").await.unwrap_err();
        assert!(matches!(err, WeatherError::CityNotFound(city) if city == "atlantis"));
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 0);
        assert!(store.recent_queries(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_found() {
        let provider = Arc::new(CountingProvider {
            known_city: Some("paris"),
            fetch_fails: true,
            ..Default::default()
        });
        let (resolver, store) = resolver_with(provider).await;

        assert!(matches!(
            resolver.resolve("paris").await,
            Err(WeatherError::CityNotFound(_))
        ));
        assert!(store.recent_queries(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_scheduled_marks_done_and_caches() {
        let provider = Arc::new(CountingProvider {
            known_city: Some("paris"),
            ..Default::default()
        });
        let (resolver, store) = resolver_with(provider).await;
        let pending = store
            .create_query("paris", QueryStatus::Pending, None)
            .await
            .unwrap();

        let done = resolver
            .complete_scheduled(&pending.query_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(done.status, QueryStatus::Done);
        assert!(done.data.is_some());
        assert_eq!(resolver.cache().get("paris").await, Some(done));
    }

    #[tokio::test]
    async fn test_complete_scheduled_failure_leaves_pending() {
        let provider = Arc::new(CountingProvider::default());
        let (resolver, store) = resolver_with(provider).await;
        let pending = store
            .create_query("atlantis", QueryStatus::Pending, None)
            .await
            .unwrap();

        let outcome = resolver.complete_scheduled(&pending.query_id).await.unwrap();
        assert!(outcome.is_none());

        let stored = store.get_query(&pending.query_id).await.unwrap().unwrap();
        assert_eq!(stored.status, QueryStatus::Pending);
        assert!(stored.data.is_none());
        assert!(resolver.cache().get("atlantis").await.is_none());
    }

    #[tokio::test]
    async fn test_complete_scheduled_fetch_failure_leaves_pending() {
        let provider = Arc::new(CountingProvider {
            known_city: Some("paris"),
            fetch_fails: true,
            ..Default::default()
        });
        let (resolver, store) = resolver_with(provider.clone()).await;
        let pending = store
            .create_query("paris", QueryStatus::Pending, None)
            .await
            .unwrap();

        let outcome = resolver.complete_scheduled(&pending.query_id).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);

        let stored = store.get_query(&pending.query_id).await.unwrap().unwrap();
        assert_eq!(stored.status, QueryStatus::Pending);
        assert!(stored.data.is_none());
        assert!(resolver.cache().get("paris").await.is_none());
    }

    #[tokio::test]
    async fn test_complete_scheduled_unknown_id() {
        let provider = Arc::new(CountingProvider::default());
        let (resolver, _store) = resolver_with(provider).await;

        assert!(matches!(
            resolver.complete_scheduled("missing").await,
            Err(WeatherError::QueryNotFound(_))
        ));
    }
}
