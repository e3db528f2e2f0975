//! Outcome of one weather resolution

use bytes::Bytes;
use serde::Serialize;

use super::{CurrentConditions, DailyForecastSeries, ResolvedPlace};
use crate::error::ErrorReason;
use crate::weather::codes;

/// Diagnostic attached when no image could be extracted
pub const NO_IMAGE_FOUND: &str = "no-image-found";
/// Diagnostic attached when the screenshot fallback was wanted but no renderer exists
pub const SCREENSHOT_UNAVAILABLE: &str = "screenshot-unavailable";
/// Diagnostic attached when the screenshot fallback itself failed
pub const SCREENSHOT_FAILED: &str = "screenshot-failed";

/// Result of resolving a query; exactly one variant is populated
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source")]
pub enum WeatherResult {
    #[serde(rename = "bmkg")]
    Bmkg(BmkgImage),
    #[serde(rename = "open-meteo")]
    Forecast(ForecastReport),
    #[serde(rename = "error")]
    Error { reason: ErrorReason },
}

/// Image found on (or captured from) an authority page
#[derive(Debug, Clone, Default, Serialize)]
pub struct BmkgImage {
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "message", skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    /// PNG screenshot of the page, only set by the screenshot fallback
    #[serde(skip)]
    pub screenshot: Option<Bytes>,
}

impl BmkgImage {
    #[must_use]
    pub fn found(image_url: String) -> Self {
        Self {
            image_url: Some(image_url),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn missing(diagnostic: &str) -> Self {
        Self {
            image_url: None,
            diagnostic: Some(diagnostic.to_string()),
            screenshot: None,
        }
    }
}

/// Forecast for a geocoded place
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    #[serde(flatten)]
    pub place: ResolvedPlace,
    pub current: CurrentConditions,
    pub daily: DailyForecastSeries,
    pub summary: ConditionSummary,
}

impl ForecastReport {
    #[must_use]
    pub fn new(place: ResolvedPlace, current: CurrentConditions, daily: DailyForecastSeries) -> Self {
        let summary = ConditionSummary::from_code(current.weather_code);
        Self {
            place,
            current,
            daily,
            summary,
        }
    }

    /// Plain-text summary used as chat reply and photo caption
    #[must_use]
    pub fn text_summary(&self) -> String {
        format!(
            "Cuaca untuk: {}\nStatus: {}\nSuhu: {}°C\nKecepatan angin: {} km/h (arah {}°)\nSumber: Open-Meteo.",
            self.place.display_name,
            self.summary.description,
            self.current.temperature,
            self.current.wind_speed,
            self.current.wind_direction,
        )
    }
}

/// Human-facing rendering hints derived from the current weather code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionSummary {
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl ConditionSummary {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        Self {
            description: codes::describe(code),
            icon: codes::icon_id(code),
            color: codes::color_band(Some(code)),
        }
    }
}
