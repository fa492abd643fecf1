use serde_json::json;
use weather_api::clients::{Coordinates, OpenWeatherClient, WeatherProvider};
use weather_api::config::OpenWeatherConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, units: Option<&str>) -> OpenWeatherClient {
    let config = OpenWeatherConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        units: units.map(str::to_string),
        request_timeout_seconds: 5,
    };
    OpenWeatherClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_lookup_returns_first_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "london"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "London", "lat": 51.5073219, "lon": -0.1276474, "country": "GB"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let coords = client_for(&server, None).lookup("london").await.unwrap();
    assert_eq!(
        coords,
        Coordinates {
            lat: 51.5073219,
            lon: -0.1276474
        }
    );
}

#[tokio::test]
async fn test_lookup_empty_result_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client_for(&server, None).lookup("atlantis").await.is_none());
}

#[tokio::test]
async fn test_lookup_error_status_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"cod": 401, "message": "Invalid API key"})),
        )
        .mount(&server)
        .await;

    assert!(client_for(&server, None).lookup("london").await.is_none());
}

#[tokio::test]
async fn test_lookup_malformed_body_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert!(client_for(&server, None).lookup("london").await.is_none());
}

#[tokio::test]
async fn test_fetch_returns_raw_payload() {
    let server = MockServer::start().await;
    let payload = json!({
        "weather": [{"id": 804, "main": "Clouds"}],
        "main": {"temp": 281.2, "humidity": 81},
        "name": "Paris"
    });

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "48.8589"))
        .and(query_param("lon", "2.32"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client_for(&server, None)
        .fetch(Coordinates {
            lat: 48.8589,
            lon: 2.32,
        })
        .await
        .unwrap();
    assert_eq!(fetched, payload);
}

#[tokio::test]
async fn test_fetch_passes_units() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"main": {"temp": 8.05}})))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client_for(&server, Some("metric"))
        .fetch(Coordinates { lat: 0.0, lon: 0.0 })
        .await
        .unwrap();
    assert_eq!(fetched["main"]["temp"], 8.05);
}

#[tokio::test]
async fn test_fetch_error_status_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetched = client_for(&server, None)
        .fetch(Coordinates { lat: 1.0, lon: 2.0 })
        .await;
    assert!(fetched.is_none());
}
