pub mod openweather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openweather::{Endpoint, OpenWeatherClient};

/// A resolved position for a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Upstream lookups the resolver depends on.
///
/// Both methods are best effort: any upstream problem (transport error,
/// non-success status, empty or malformed body) comes back as `None`.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Geocodes a free-text city name.
    async fn lookup(&self, city: &str) -> Option<Coordinates>;

    /// Current conditions at `coords`, as the raw provider payload.
    async fn fetch(&self, coords: Coordinates) -> Option<serde_json::Value>;
}
