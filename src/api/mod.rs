use axum::{Router, http::HeaderValue, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod error;
mod observability;
pub mod throttle;
mod types;
mod validation;
mod weather;

pub use error::ApiError;
pub use throttle::RequestThrottle;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub throttle: Arc<RequestThrottle>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn cache(&self) -> &crate::services::WeatherCache {
        &self.shared.cache
    }

    #[must_use]
    pub fn weather_service(&self) -> &Arc<dyn crate::services::WeatherService> {
        &self.shared.weather_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let throttle = Arc::new(RequestThrottle::new(&shared.config.throttle));

    Arc::new(AppState {
        shared,
        throttle,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config().server.cors_allowed_origins;

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(create_weather_router(state.clone()))
        .route("/health", get(observability::health))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_weather_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather", get(weather::retrieve_weather))
        .route("/weather/schedule", get(weather::schedule_weather))
        .route("/weather/history", get(weather::list_history))
        .route("/weather/result/{query_id}", get(weather::get_result))
        .route_layer(middleware::from_fn_with_state(
            state,
            throttle::throttle_middleware,
        ))
}
