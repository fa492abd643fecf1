use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{QueryStatus, WeatherQuery, title_case};

/// Body of every error response: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Public shape of a weather query. The city is rendered title-cased.
#[derive(Debug, Serialize)]
pub struct WeatherQueryDto {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub city_name: String,
    pub status: QueryStatus,
    pub query_id: String,
    pub data: Option<serde_json::Value>,
}

impl From<WeatherQuery> for WeatherQueryDto {
    fn from(query: WeatherQuery) -> Self {
        Self {
            created_at: query.created_at,
            updated_at: query.updated_at,
            city_name: title_case(&query.city_name),
            status: query.status,
            query_id: query.query_id,
            data: query.data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_title_cases_city_and_keeps_null_data() {
        let query = WeatherQuery {
            id: 3,
            query_id: "f00d".to_string(),
            city_name: "belo horizonte".to_string(),
            status: QueryStatus::Pending,
            data: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(WeatherQueryDto::from(query)).unwrap();
        assert_eq!(json["city_name"], "Belo Horizonte");
        assert_eq!(json["status"], "pending");
        assert!(json["data"].is_null());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_error_response_is_a_bare_envelope() {
        let json = serde_json::to_value(ErrorResponse::new("city: Query parameter is required."))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": "city: Query parameter is required."
            })
        );
    }
}
