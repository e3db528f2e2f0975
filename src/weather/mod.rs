//! Forecast fetching and weather code lookups

use async_trait::async_trait;

use crate::error::WeatherError;
use crate::models::{Forecast, Horizon, ResolvedPlace};

pub mod codes;
pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Source of current conditions plus a daily forecast series
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the forecast for a place, with every daily series cut to `horizon`
    ///
    /// Fails with [`WeatherError::MissingCurrentConditions`] when the upstream
    /// response has no current weather block.
    async fn fetch(&self, place: &ResolvedPlace, horizon: Horizon)
    -> Result<Forecast, WeatherError>;
}
