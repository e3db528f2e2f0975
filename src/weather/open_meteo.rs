//! Open-Meteo forecast client
//!
//! Requests `current_weather` plus the daily weather code and temperature
//! extremes. No API key is required.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::ForecastProvider;
use crate::error::WeatherError;
use crate::models::{CurrentConditions, DailyForecastSeries, Forecast, Horizon, ResolvedPlace};

const DAILY_SERIES: &str = "weathercode,temperature_2m_max,temperature_2m_min";

/// Forecast response from `OpenMeteo`; only the parts we use
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentConditions>,
    #[serde(default)]
    daily: Option<DailyForecastSeries>,
}

/// Open-Meteo HTTP client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client against `base_url` (e.g. `https://api.open-meteo.com/v1`)
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    #[instrument(skip(self, place), fields(lat = %place.latitude, lon = %place.longitude, days = horizon.days()))]
    async fn fetch(
        &self,
        place: &ResolvedPlace,
        horizon: Horizon,
    ) -> Result<Forecast, WeatherError> {
        let start_time = Instant::now();
        debug!("Requesting Open-Meteo forecast");

        let response = self
            .client
            .get(self.forecast_url())
            .query(&[
                ("latitude", place.latitude.as_str()),
                ("longitude", place.longitude.as_str()),
                ("current_weather", "true"),
                ("daily", DAILY_SERIES),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Open-Meteo request failed");
            return Err(WeatherError::upstream(format!(
                "Open-Meteo returned HTTP {status}"
            )));
        }

        let body: ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Open-Meteo response: {}", e);
            WeatherError::upstream(format!("Invalid forecast data from Open-Meteo: {e}"))
        })?;

        let Some(current) = body.current_weather else {
            warn!("Open-Meteo response has no current_weather block");
            return Err(WeatherError::MissingCurrentConditions);
        };
        let daily = body.daily.unwrap_or_default().truncated(horizon);

        info!(
            "Fetched forecast for {} ({} days) in {:.3}s",
            place.display_name,
            daily.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(Forecast { current, daily })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url_trims_slash() {
        let client = OpenMeteoClient::new(Client::new(), "https://api.open-meteo.com/v1/");
        assert_eq!(
            client.forecast_url(),
            "https://api.open-meteo.com/v1/forecast"
        );
    }

    #[test]
    fn test_response_without_current_weather() {
        let body: ForecastResponse =
            serde_json::from_str(r#"{"latitude": -6.2, "longitude": 106.8}"#).unwrap();
        assert!(body.current_weather.is_none());
        assert!(body.daily.is_none());
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "current_weather": {"temperature": 28.1, "windspeed": 5.0, "winddirection": 90, "weathercode": 2, "interval": 900},
            "daily": {"time": ["2024-11-13"], "weathercode": [2], "temperature_2m_max": [31.2], "temperature_2m_min": [24.0]}
        }"#;
        let body: ForecastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.current_weather.unwrap().weather_code, 2);
        assert_eq!(body.daily.unwrap().len(), 1);
    }
}
