//! Per-client request throttle for the public weather routes.
//!
//! Every anonymous client gets a token bucket holding one minute's worth of
//! requests that refills continuously. Clients are identified by socket peer
//! address; `X-Forwarded-For` is honoured only when the peer is a trusted
//! proxy.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::{ApiError, AppState};
use crate::config::ThrottleConfig;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_consume(&mut self, per_second: f64, capacity: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = elapsed.mul_add(per_second, self.tokens).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
pub struct RequestThrottle {
    enabled: bool,
    capacity: f64,
    per_second: f64,
    trusted_proxies: Vec<IpAddr>,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RequestThrottle {
    #[must_use]
    pub fn new(config: &ThrottleConfig) -> Self {
        let capacity = f64::from(config.requests_per_minute);
        let trusted_proxies = config
            .trusted_proxy_ips
            .iter()
            .filter_map(|ip| ip.parse().ok())
            .collect();

        Self {
            enabled: config.enabled,
            capacity,
            per_second: capacity / 60.0,
            trusted_proxies,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Consumes one request from `client`'s budget. Returns false when the
    /// budget is exhausted.
    pub async fn check(&self, client: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity))
            .try_consume(self.per_second, self.capacity)
    }

    /// Drops buckets that have been idle for longer than `older_than`.
    pub async fn cleanup(&self, older_than: Duration) {
        let mut buckets = self.buckets.lock().await;
        let Some(cutoff) = Instant::now().checked_sub(older_than) else {
            return;
        };
        buckets.retain(|_, bucket| bucket.last_update > cutoff);
    }

    pub async fn tracked_clients(&self) -> usize {
        self.buckets.lock().await.len()
    }

    fn client_key(&self, req: &Request) -> String {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let behind_trusted_proxy = peer.is_some_and(|ip| self.trusted_proxies.contains(&ip));
        if behind_trusted_proxy
            && let Some(forwarded) = forwarded_client(req)
        {
            return forwarded.to_string();
        }

        peer.map_or_else(|| "anonymous".to_string(), |ip| ip.to_string())
    }
}

fn forwarded_client(req: &Request) -> Option<IpAddr> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
}

pub async fn throttle_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let throttle = &state.throttle;
    let client = throttle.client_key(&req);

    if throttle.check(&client).await {
        next.run(req).await
    } else {
        debug!(client = %client, "Request throttled");
        metrics::counter!("http_requests_throttled_total").increment(1);
        ApiError::TooManyRequests("Request was throttled. Try again later.".to_string())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(requests_per_minute: u32) -> RequestThrottle {
        RequestThrottle::new(&ThrottleConfig {
            enabled: true,
            requests_per_minute,
            trusted_proxy_ips: vec!["10.0.0.1".to_string()],
        })
    }

    fn request_from(peer: &str, forwarded: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/weather");
        if let Some(ip) = forwarded {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut req = builder.body(axum::body::Body::empty()).unwrap();
        let addr: SocketAddr = format!("{peer}:4000").parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn test_budget_is_per_client() {
        let throttle = throttle(2);

        assert!(throttle.check("1.1.1.1").await);
        assert!(throttle.check("1.1.1.1").await);
        assert!(!throttle.check("1.1.1.1").await);

        assert!(throttle.check("2.2.2.2").await);
    }

    #[tokio::test]
    async fn test_disabled_throttle_allows_everything() {
        let throttle = RequestThrottle::new(&ThrottleConfig {
            enabled: false,
            requests_per_minute: 1,
            trusted_proxy_ips: Vec::new(),
        });

        for _ in 0..5 {
            assert!(throttle.check("1.1.1.1").await);
        }
        assert_eq!(throttle.tracked_clients().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_buckets() {
        let throttle = throttle(5);
        throttle.check("1.1.1.1").await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        throttle.cleanup(Duration::from_millis(10)).await;
        assert_eq!(throttle.tracked_clients().await, 0);
    }

    #[test]
    fn test_forwarded_header_only_from_trusted_proxy() {
        let throttle = throttle(5);

        let trusted = request_from("10.0.0.1", Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(throttle.client_key(&trusted), "203.0.113.7");

        let spoofed = request_from("198.51.100.2", Some("203.0.113.7"));
        assert_eq!(throttle.client_key(&spoofed), "198.51.100.2");

        let bare = Request::builder()
            .uri("/weather")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(throttle.client_key(&bare), "anonymous");
    }
}
