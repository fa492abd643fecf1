use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_city;
use super::{ApiError, AppState, WeatherQueryDto};

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

/// `GET /weather?city=<name>`
pub async fn retrieve_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityQuery>,
) -> Result<Json<WeatherQueryDto>, ApiError> {
    let city = validate_city(params.city.as_deref())?;
    let query = state.weather_service().current_weather(city).await?;
    Ok(Json(query.into()))
}

/// `GET /weather/schedule?city=<name>`
pub async fn schedule_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityQuery>,
) -> Result<Json<WeatherQueryDto>, ApiError> {
    let city = validate_city(params.city.as_deref())?;
    let query = state.weather_service().schedule(city).await?;
    Ok(Json(query.into()))
}

/// `GET /weather/result/{query_id}`
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(query_id): Path<String>,
) -> Result<Json<WeatherQueryDto>, ApiError> {
    let query = state.weather_service().get_result(&query_id).await?;
    Ok(Json(query.into()))
}

/// `GET /weather/history`
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WeatherQueryDto>>, ApiError> {
    let history = state.weather_service().history().await?;
    Ok(Json(history.into_iter().map(WeatherQueryDto::from).collect()))
}
