//! Current conditions, daily series and forecast horizon

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Series names requested from the forecast API
pub const SERIES_TIME: &str = "time";
pub const SERIES_WEATHER_CODE: &str = "weathercode";
pub const SERIES_TEMPERATURE_MAX: &str = "temperature_2m_max";
pub const SERIES_TEMPERATURE_MIN: &str = "temperature_2m_min";

/// Number of forecast days, always within `1..=14`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Horizon(u8);

impl Horizon {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 14;
    pub const DEFAULT: u8 = 5;

    /// Clamp any requested day count into range
    #[must_use]
    pub fn new(days: i64) -> Self {
        let clamped = days.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Self(u8::try_from(clamped).unwrap_or(Self::DEFAULT))
    }

    /// Parse a `days` query value; missing or non-numeric input gives the default
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|days| days.is_finite())
            .map_or_else(Self::default, |days| Self::new(days.trunc() as i64))
    }

    #[must_use]
    pub const fn days(self) -> usize {
        self.0 as usize
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Current weather as reported by Open-Meteo's `current_weather` block
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Wind speed in km/h
    #[serde(rename = "windspeed")]
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    #[serde(rename = "winddirection")]
    pub wind_direction: f64,
    /// WMO weather code
    #[serde(rename = "weathercode")]
    pub weather_code: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_day: Option<u8>,
}

/// Daily forecast series keyed by series name
///
/// All array-valued entries share the same index space: entry `i` of every
/// series describes day `i`. Non-array entries are kept as received.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct DailyForecastSeries(Map<String, Value>);

impl DailyForecastSeries {
    #[must_use]
    pub const fn new(series: Map<String, Value>) -> Self {
        Self(series)
    }

    /// Keep the first `horizon` entries of every array-valued series
    pub fn truncate(&mut self, horizon: Horizon) {
        for value in self.0.values_mut() {
            if let Value::Array(values) = value {
                values.truncate(horizon.days());
            }
        }
    }

    #[must_use]
    pub fn truncated(mut self, horizon: Horizon) -> Self {
        self.truncate(horizon);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Lengths of all array-valued series
    pub fn series_lengths(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().filter_map(|(name, value)| {
            value.as_array().map(|values| (name.as_str(), values.len()))
        })
    }

    /// Number of days covered, taken from the `time` series
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// ISO dates (`YYYY-MM-DD`) of each day
    #[must_use]
    pub fn dates(&self) -> Vec<&str> {
        self.array(SERIES_TIME)
            .iter()
            .map(|v| v.as_str().unwrap_or_default())
            .collect()
    }

    #[must_use]
    pub fn weather_codes(&self) -> Vec<Option<u8>> {
        self.array(SERIES_WEATHER_CODE)
            .iter()
            .map(|v| v.as_u64().and_then(|code| u8::try_from(code).ok()))
            .collect()
    }

    #[must_use]
    pub fn temperature_max(&self) -> Vec<Option<f64>> {
        self.numbers(SERIES_TEMPERATURE_MAX)
    }

    #[must_use]
    pub fn temperature_min(&self) -> Vec<Option<f64>> {
        self.numbers(SERIES_TEMPERATURE_MIN)
    }

    fn numbers(&self, name: &str) -> Vec<Option<f64>> {
        self.array(name).iter().map(Value::as_f64).collect()
    }

    fn array(&self, name: &str) -> &[Value] {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }
}

/// Current conditions plus the daily series of one forecast call
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub current: CurrentConditions,
    pub daily: DailyForecastSeries,
}
