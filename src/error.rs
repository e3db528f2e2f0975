//! Error types and handling for the `cuaca` weather service

use serde::Serialize;
use thiserror::Error;

/// Logical failure reasons carried inside a [`crate::WeatherResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorReason {
    /// Geocoding returned zero results
    #[serde(rename = "location not found")]
    NotFound,
    /// The forecast API answered without usable data
    #[serde(rename = "failed to get weather")]
    UpstreamFailure,
}

impl ErrorReason {
    /// Wire representation used in JSON error bodies
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "location not found",
            Self::UpstreamFailure => "failed to get weather",
        }
    }

    /// Chat-facing notice for the reason
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::NotFound => "Lokasi tidak ditemukan. Coba kata kunci lain.",
            Self::UpstreamFailure => "Gagal mendapatkan data cuaca untuk lokasi tersebut.",
        }
    }
}

/// Main error type for the weather pipeline and its surfaces
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Missing or malformed user input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Nothing matched the query
    #[error("Not found: {query}")]
    NotFound { query: String },

    /// An outbound call failed or returned something unusable
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// The forecast response carried no current conditions
    #[error("Forecast response lacks current conditions")]
    MissingCurrentConditions,

    /// No render collaborator is configured in this deployment
    #[error("Renderer unavailable")]
    RenderUnavailable,

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Map the error onto the logical failure taxonomy, if it belongs there
    #[must_use]
    pub const fn reason(&self) -> Option<ErrorReason> {
        match self {
            Self::NotFound { .. } => Some(ErrorReason::NotFound),
            Self::Upstream { .. } | Self::MissingCurrentConditions => {
                Some(ErrorReason::UpstreamFailure)
            }
            _ => None,
        }
    }

    /// Get a chat-friendly message; never includes upstream details
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { .. } => {
                "Gunakan: /cuaca <kota atau alamat>. Contoh: /cuaca Bandung".to_string()
            }
            Self::NotFound { .. } => ErrorReason::NotFound.user_message().to_string(),
            Self::MissingCurrentConditions => {
                ErrorReason::UpstreamFailure.user_message().to_string()
            }
            Self::RenderUnavailable => {
                "Fitur gambar tidak tersedia karena renderer belum dikonfigurasi.".to_string()
            }
            Self::Upstream { .. } | Self::Config { .. } | Self::Io { .. } => {
                "Terjadi kesalahan saat mengambil data cuaca. Coba lagi nanti.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::upstream(err.to_string())
    }
}
