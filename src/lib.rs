//! `cuaca` - weather lookups for Indonesian places and BMKG pages
//!
//! This library resolves a free-text location or a BMKG page URL into either
//! a scraped weather image or an Open-Meteo forecast, renders forecast cards,
//! and serves the results over an HTTP API and a Telegram bot.

pub mod api;
pub mod bmkg;
pub mod config;
pub mod error;
pub mod http;
pub mod location_resolver;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod telegram;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use bmkg::{BmkgScraper, ExtractionPolicy, ImageExtractor};
pub use config::CuacaConfig;
pub use error::{ErrorReason, WeatherError};
pub use location_resolver::{Geocoder, NominatimClient};
pub use models::{BmkgImage, ForecastReport, Horizon, ResolvedPlace, WeatherResult};
pub use pipeline::{PipelineOptions, WeatherPipeline};
pub use render::{CardRenderer, GotenbergRenderer, HtmlRenderer};
pub use weather::{ForecastProvider, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
