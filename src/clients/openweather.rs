//! OpenWeather HTTP client.
//!
//! A single client serves both upstream endpoints used by the service:
//! direct geocoding (city name to coordinates) and current weather by
//! coordinates. Every request carries the configured API key as `appid`.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Coordinates, WeatherProvider};
use crate::config::OpenWeatherConfig;

/// The upstream endpoints this client can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Geocoding,
    CurrentWeather,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Geocoding => "/geo/1.0/direct",
            Self::CurrentWeather => "/data/2.5/weather",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Geocoding => "geocoding",
            Self::CurrentWeather => "current_weather",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingEntry {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(config: &OpenWeatherConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("weather-api/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build OpenWeather HTTP client: {e}"))?;

        Ok(Self::with_shared_client(client, config))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &OpenWeatherConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            units: config.units.clone(),
        }
    }

    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Sends one request to `endpoint` with `params` plus the API key.
    ///
    /// Transport failures are logged and reported as `None`, so callers only
    /// have to check for a missing or unsuccessful response.
    pub async fn request(
        &self,
        method: Method,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Option<Response> {
        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("appid", self.api_key.as_str()));

        match self
            .client
            .request(method, self.url(endpoint))
            .query(&query)
            .send()
            .await
        {
            Ok(response) => {
                debug!(
                    endpoint = endpoint.name(),
                    status = response.status().as_u16(),
                    "OpenWeather responded"
                );
                Some(response)
            }
            Err(e) => {
                warn!(endpoint = endpoint.name(), error = %e, "OpenWeather request failed");
                None
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn lookup(&self, city: &str) -> Option<Coordinates> {
        let params = [("q", city.to_string()), ("limit", "1".to_string())];
        let response = self
            .request(Method::GET, Endpoint::Geocoding, &params)
            .await?;

        if !response.status().is_success() {
            warn!(city, status = response.status().as_u16(), "Geocoding failed");
            return None;
        }

        let entries: Vec<GeocodingEntry> = match response.json().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(city, error = %e, "Failed to decode geocoding response");
                return None;
            }
        };

        let first = entries.into_iter().next()?;
        Some(Coordinates {
            lat: first.lat?,
            lon: first.lon?,
        })
    }

    async fn fetch(&self, coords: Coordinates) -> Option<serde_json::Value> {
        let mut params = vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())];
        if let Some(units) = &self.units {
            params.push(("units", units.clone()));
        }

        let response = self
            .request(Method::GET, Endpoint::CurrentWeather, &params)
            .await?;

        if !response.status().is_success() {
            warn!(
                lat = coords.lat,
                lon = coords.lon,
                status = response.status().as_u16(),
                "Current weather request failed"
            );
            return None;
        }

        match response.json().await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(error = %e, "Failed to decode current weather response");
                None
            }
        }
    }
}
