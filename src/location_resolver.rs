//! Location Resolution Module
//!
//! Turns a free-text place description into a [`ResolvedPlace`] using the
//! [Nominatim](https://nominatim.openstreetmap.org) search API.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::WeatherError;
use crate::models::ResolvedPlace;

/// Geocoding collaborator
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `query`, or `None` when nothing matched
    async fn lookup(&self, query: &str) -> Result<Option<ResolvedPlace>, WeatherError>;
}

/// Raw Nominatim API response entry
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl From<NominatimPlace> for ResolvedPlace {
    fn from(place: NominatimPlace) -> Self {
        Self::new(place.display_name, place.lat, place.lon)
    }
}

/// Nominatim-based geocoder
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    /// `client` must carry an identifying `User-Agent`; Nominatim rejects anonymous clients
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<Option<ResolvedPlace>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::invalid_input("Location cannot be empty"));
        }

        info!("Geocoding location: '{}'", query);
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Geocoding request failed");
            return Err(WeatherError::upstream(format!(
                "Nominatim returned HTTP {status}"
            )));
        }

        let results: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            WeatherError::upstream(format!("Invalid geocoding data from Nominatim: {e}"))
        })?;

        let Some(first) = results.into_iter().next() else {
            warn!("No results found for location '{}'", query);
            return Ok(None);
        };

        debug!(
            "Found location: {} ({}, {}) in {:.3}s",
            first.display_name,
            first.lat,
            first.lon,
            start_time.elapsed().as_secs_f64()
        );
        Ok(Some(first.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominatim_result_parsing() {
        let json = r#"[{"place_id": 1, "lat": "-6.1753942", "lon": "106.827183", "display_name": "Jakarta, Indonesia", "address": {"country": "Indonesia"}}]"#;
        let results: Vec<NominatimPlace> = serde_json::from_str(json).unwrap();
        let place: ResolvedPlace = results.into_iter().next().unwrap().into();
        assert_eq!(place.display_name, "Jakarta, Indonesia");
        assert_eq!(place.latitude, "-6.1753942");
        assert_eq!(place.longitude, "106.827183");
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_without_a_call() {
        // Port 9 is discard; reaching the network would fail differently.
        let geocoder = NominatimClient::new(Client::new(), "http://127.0.0.1:9");
        let result = geocoder.lookup("   ").await;
        assert!(matches!(result, Err(WeatherError::InvalidInput { .. })));
    }
}
