use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::clients::{OpenWeatherClient, WeatherProvider};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    SeaOrmWeatherService, ScheduledQueryWorker, WeatherCache, WeatherResolver, WeatherService,
    worker,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub cache: WeatherCache,

    pub resolver: Arc<WeatherResolver>,

    pub weather_service: Arc<dyn WeatherService>,

    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SharedState {
    /// Builds the state against the real OpenWeather API and starts the
    /// scheduled query worker.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let provider = Arc::new(OpenWeatherClient::new(&config.openweather)?);
        Self::with_provider(config, provider).await
    }

    pub async fn with_provider(
        config: Config,
        provider: Arc<dyn WeatherProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let cache = WeatherCache::new(&config.cache);
        let resolver = Arc::new(WeatherResolver::new(store.clone(), provider, cache.clone()));

        // The worker stops once the service holding the submitter is dropped.
        let (submitter, receiver) = worker::channel();
        let worker =
            ScheduledQueryWorker::new(resolver.clone(), receiver, config.worker.concurrency).start();

        let weather_service = Arc::new(SeaOrmWeatherService::new(
            store.clone(),
            resolver.clone(),
            Arc::new(submitter),
        )) as Arc<dyn WeatherService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            cache,
            resolver,
            weather_service,
            worker: Arc::new(Mutex::new(Some(worker))),
        })
    }

    /// Hands out the scheduled query worker's handle, once.
    ///
    /// The worker finishes after every clone of this state is dropped and
    /// the queries it already accepted have been attempted.
    pub fn take_worker(&self) -> Option<JoinHandle<()>> {
        self.worker.lock().ok()?.take()
    }
}
