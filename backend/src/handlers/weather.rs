//! HTTP handlers for the weather lookup endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::external::weather::{CurrentConditions, WeatherClient};
use crate::AppState;

/// Query parameters for the current-weather lookup
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherQuery {
    pub location: String,
}

/// Fetch current conditions for a market location so the client can
/// attach them to a stock batch
pub async fn fetch_current_weather(
    State(state): State<AppState>,
    Query(query): Query<CurrentWeatherQuery>,
) -> AppResult<Json<CurrentConditions>> {
    let weather = &state.config.weather;
    if weather.api_key.is_empty() {
        return Err(AppError::Configuration(
            "weather API key is not configured".to_string(),
        ));
    }

    let client = WeatherClient::new(weather.api_key.clone(), weather.api_endpoint.clone());
    let conditions = client.get_current(&query.location).await?;
    Ok(Json(conditions))
}
