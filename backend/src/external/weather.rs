//! Weather API client for fetching current conditions
//!
//! Integrates with OpenWeatherMap. Only used to offer clients a snapshot
//! they can attach to a stock batch; the core never fetches weather on
//! its own.

use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current weather conditions for a market location, shaped so the client
/// can attach the fields to a batch item as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub location: String,
    pub weather_condition: String,
    pub weather_description: String,
    pub weather_temperature: Decimal,
    pub weather_high_temp: Decimal,
    pub weather_low_temp: Decimal,
    pub humidity_percent: i32,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    weather: Vec<OwmWeather>,
    main: OwmMain,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: i32,
}

impl WeatherClient {
    /// Create a new WeatherClient instance
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Fetch current conditions for a location by city name
    pub async fn get_current(&self, location: &str) -> AppResult<CurrentConditions> {
        let url = format!("{}/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|_| AppError::WeatherServiceUnavailable)?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "weather API returned {}",
                response.status()
            )));
        }

        let body: OwmCurrentResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let conditions = body.weather.into_iter().next().ok_or_else(|| {
            AppError::ExternalService("weather API response missing conditions".to_string())
        })?;

        Ok(CurrentConditions {
            location: body.name,
            weather_condition: conditions.main,
            weather_description: conditions.description,
            weather_temperature: decimal_from_f64(body.main.temp)?,
            weather_high_temp: decimal_from_f64(body.main.temp_max)?,
            weather_low_temp: decimal_from_f64(body.main.temp_min)?,
            humidity_percent: body.main.humidity,
        })
    }
}

fn decimal_from_f64(value: f64) -> AppResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| {
        AppError::ExternalService("weather API returned a non-numeric temperature".to_string())
    })
}
