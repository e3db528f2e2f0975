//! Configuration management for the `cuaca` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuacaConfig {
    /// Shared outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Geocoding API settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Forecast API settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Weather authority website settings
    #[serde(default)]
    pub bmkg: BmkgConfig,
    /// Screenshot renderer settings
    #[serde(default)]
    pub render: RenderConfig,
    /// HTTP API server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Telegram bot settings
    #[serde(default)]
    pub bot: BotConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Identifying `User-Agent` sent with every outbound request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Overall request timeout in seconds; unset means no client-wide timeout
    #[serde(default)]
    pub timeout_seconds: Option<u32>,
}

/// Geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// Forecast API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Weather authority website settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmkgConfig {
    /// Host fragment that marks a URL query as an authority page
    #[serde(default = "default_bmkg_host_fragment")]
    pub host_fragment: String,
    /// Origin used to absolutize root-relative image paths
    #[serde(default = "default_bmkg_base_origin")]
    pub base_origin: String,
}

/// Screenshot renderer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Gotenberg base URL; image features are disabled when unset
    #[serde(default)]
    pub gotenberg_url: Option<String>,
    /// Screenshot request timeout in seconds
    #[serde(default = "default_render_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory served for non-API paths
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Screenshot authority pages without an extractable image
    #[serde(default)]
    pub screenshot_fallback: bool,
    /// Accept any raster `img` on authority pages as a last resort
    #[serde(default)]
    pub raster_fallback: bool,
    /// PEM certificate for TLS; both cert and key enable HTTPS
    #[serde(default)]
    pub tls_cert: Option<String>,
    /// PEM private key for TLS
    #[serde(default)]
    pub tls_key: Option<String>,
}

/// Telegram bot settings
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token
    #[serde(default)]
    pub token: Option<String>,
    /// Bot API root URL
    #[serde(default = "default_bot_api_url")]
    pub api_url: String,
    /// Long-polling timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u32,
    /// Screenshot authority pages without an extractable image
    #[serde(default = "default_true")]
    pub screenshot_fallback: bool,
    /// Accept any raster `img` on authority pages as a last resort
    #[serde(default = "default_true")]
    pub raster_fallback: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; span export is off when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    /// Service name reported to the collector
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_user_agent() -> String {
    "BOTPADIL/1.0 (+https://github.com/)".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_bmkg_host_fragment() -> String {
    crate::pipeline::DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_bmkg_base_origin() -> String {
    "https://www.bmkg.go.id".to_string()
}

fn default_render_timeout() -> u32 {
    30
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_bot_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_service_name() -> String {
    "cuaca".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: None,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for BmkgConfig {
    fn default() -> Self {
        Self {
            host_fragment: default_bmkg_host_fragment(),
            base_origin: default_bmkg_base_origin(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gotenberg_url: None,
            timeout_seconds: default_render_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
            screenshot_fallback: false,
            raster_fallback: false,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_bot_api_url(),
            poll_timeout_seconds: default_poll_timeout(),
            screenshot_fallback: true,
            raster_fallback: true,
        }
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("poll_timeout_seconds", &self.poll_timeout_seconds)
            .field("screenshot_fallback", &self.screenshot_fallback)
            .field("raster_fallback", &self.raster_fallback)
            .finish()
    }
}

impl BotConfig {
    /// Token wrapped so it cannot end up in logs
    #[must_use]
    pub fn secret_token(&self) -> Option<SecretString> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.to_string()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
            service_name: default_service_name(),
        }
    }
}

impl CuacaConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides such as CUACA_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("CUACA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CuacaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_aliases()?;
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cuaca").join("config.toml"))
    }

    /// Honor the conventional `TELEGRAM_TOKEN` and `PORT` variables
    fn apply_env_aliases(&mut self) -> Result<()> {
        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            if !token.is_empty() {
                self.bot.token = Some(token);
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{port}'"))?;
        }
        Ok(())
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.bmkg.host_fragment.is_empty() {
            self.bmkg.host_fragment = default_bmkg_host_fragment();
        }
        if self.bmkg.base_origin.is_empty() {
            self.bmkg.base_origin = default_bmkg_base_origin();
        }
        if self.render.gotenberg_url.as_deref() == Some("") {
            self.render.gotenberg_url = None;
        }
        if self.render.timeout_seconds == 0 {
            self.render.timeout_seconds = default_render_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.bot.api_url.is_empty() {
            self.bot.api_url = default_bot_api_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.service_name.is_empty() {
            self.logging.service_name = default_service_name();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_urls()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds.is_some_and(|t| t == 0 || t > 300) {
            return Err(
                WeatherError::config("HTTP timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.render.timeout_seconds > 300 {
            return Err(WeatherError::config("Render timeout cannot exceed 300 seconds").into());
        }

        if self.server.port == 0 {
            return Err(WeatherError::config("Server port cannot be 0").into());
        }

        if self.bot.poll_timeout_seconds > 50 {
            return Err(
                WeatherError::config("Bot poll timeout cannot exceed 50 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(
                WeatherError::config("TLS requires both server.tls_cert and server.tls_key").into(),
            );
        }

        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        let mut urls = vec![
            ("geocoding.base_url", self.geocoding.base_url.as_str()),
            ("weather.base_url", self.weather.base_url.as_str()),
            ("bmkg.base_origin", self.bmkg.base_origin.as_str()),
            ("bot.api_url", self.bot.api_url.as_str()),
        ];
        if let Some(url) = &self.render.gotenberg_url {
            urls.push(("render.gotenberg_url", url.as_str()));
        }
        if let Some(url) = &self.logging.otlp_endpoint {
            urls.push(("logging.otlp_endpoint", url.as_str()));
        }

        for (key, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherError::config(format!(
                    "{key} must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cuaca-{}-{name}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = CuacaConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(
            config.geocoding.base_url,
            "https://nominatim.openstreetmap.org"
        );
        assert_eq!(config.http.user_agent, "BOTPADIL/1.0 (+https://github.com/)");
        assert!(config.http.timeout_seconds.is_none());
        assert_eq!(config.render.timeout_seconds, 30);
        assert_eq!(config.server.port, 3000);
        assert!(!config.server.screenshot_fallback);
        assert!(!config.server.raster_fallback);
        assert!(config.bot.screenshot_fallback);
        assert!(config.bot.raster_fallback);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = CuacaConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = CuacaConfig::default();
        config.render.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_urls() {
        let mut config = CuacaConfig::default();
        config.render.gotenberg_url = Some("gotenberg:3000".to_string());
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("render.gotenberg_url"));
    }

    #[test]
    fn test_tls_requires_cert_and_key() {
        let mut config = CuacaConfig::default();
        config.server.tls_cert = Some("cert.pem".to_string());
        assert!(config.validate().is_err());
        config.server.tls_key = Some("key.pem".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = CuacaConfig::default();
        config.weather.base_url.clear();
        config.render.gotenberg_url = Some(String::new());
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert!(config.render.gotenberg_url.is_none());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let path = write_temp_config(
            "partial",
            r#"
[render]
gotenberg_url = "http://localhost:3001"

[bot]
token = "123:abc"
raster_fallback = false
"#,
        );
        let config = CuacaConfig::load_from_path(Some(path.clone())).unwrap();
        let _ = std::fs::remove_file(path);

        assert_eq!(
            config.render.gotenberg_url.as_deref(),
            Some("http://localhost:3001")
        );
        assert!(!config.bot.raster_fallback);
        assert!(config.bot.screenshot_fallback);
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_bot_token_is_redacted() {
        let config = BotConfig {
            token: Some("123:very-secret".to_string()),
            ..BotConfig::default()
        };
        assert!(!format!("{config:?}").contains("very-secret"));
        assert_eq!(
            config.secret_token().unwrap().expose_secret(),
            "123:very-secret"
        );
        assert!(BotConfig::default().secret_token().is_none());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = CuacaConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("cuaca"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
