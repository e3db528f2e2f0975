//! Resolved place model and query classification

use serde::{Deserialize, Serialize};

/// A geocoded place
///
/// Coordinates stay as the decimal strings the geocoder returned and are
/// forwarded verbatim; parse them only where a number is actually needed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResolvedPlace {
    /// Canonical display name
    #[serde(rename = "place")]
    pub display_name: String,
    /// Latitude in decimal degrees
    #[serde(rename = "lat")]
    pub latitude: String,
    /// Longitude in decimal degrees
    #[serde(rename = "lon")]
    pub longitude: String,
}

impl ResolvedPlace {
    /// Create a new resolved place
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }
}

/// What a user query refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A page on the weather authority's website
    AuthorityPage,
    /// A free-text place name or address
    Location,
}

impl QueryKind {
    /// Classify a query: an `http(s)://` URL containing the authority host is a page
    #[must_use]
    pub fn classify(query: &str, authority_host: &str) -> Self {
        let lowered = query.to_ascii_lowercase();
        let is_url = lowered.starts_with("http://") || lowered.starts_with("https://");
        if is_url && query.contains(authority_host) {
            Self::AuthorityPage
        } else {
            Self::Location
        }
    }
}
