//! Data models for the weather pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: geocoded places and query classification
//! - Weather: current conditions, daily series and the forecast horizon
//! - Result: the tagged outcome handed to every delivery surface

pub mod location;
pub mod result;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{QueryKind, ResolvedPlace};
pub use result::{BmkgImage, ConditionSummary, ForecastReport, WeatherResult};
pub use weather::{CurrentConditions, DailyForecastSeries, Forecast, Horizon};
