//! Shared outbound HTTP client

use std::time::Duration;

use reqwest::Client;

use crate::config::HttpConfig;
use crate::error::WeatherError;

/// Build the client shared by every outbound collaborator
///
/// All requests carry the configured `User-Agent`; Nominatim and BMKG refuse
/// anonymous clients.
pub fn build_client(config: &HttpConfig) -> Result<Client, WeatherError> {
    let mut builder = Client::builder().user_agent(config.user_agent.clone());
    if let Some(seconds) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(u64::from(seconds)));
    }
    builder
        .build()
        .map_err(|e| WeatherError::config(format!("Failed to build HTTP client: {e}")))
}
