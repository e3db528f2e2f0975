//! Telegram Bot API client and the weather bot built on it

pub mod bot;
pub mod commands;
pub mod methods;
pub mod objects;

use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

pub use bot::WeatherBot;
pub use commands::Command;

use crate::telegram::methods::{DEFAULT_TIMEOUT, Method, SendPhoto};
use crate::telegram::objects::Message;

/// Telegram Bot API failure
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Transport failure; the request URL is stripped because it embeds the token
    #[error("Telegram request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Telegram API error {error_code}: {description}")]
    Api { error_code: i32, description: String },

    #[error("Telegram response has no result")]
    MissingResult,
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

/// Telegram bot API [response][1].
///
/// [1]: https://core.telegram.org/bots/api#making-requests
#[derive(Debug, Deserialize)]
#[must_use]
pub struct TelegramResult<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

impl<T> From<TelegramResult<T>> for Result<T, TelegramError> {
    fn from(response: TelegramResult<T>) -> Self {
        if !response.ok {
            return Err(TelegramError::Api {
                error_code: response.error_code.unwrap_or_default(),
                description: response.description.unwrap_or_default(),
            });
        }
        response.result.ok_or(TelegramError::MissingResult)
    }
}

/// Telegram bot API connection.
#[must_use]
#[derive(Clone)]
pub struct Telegram {
    client: Client,
    token: SecretString,
    root_url: String,
}

impl std::fmt::Debug for Telegram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telegram")
            .field("root_url", &self.root_url)
            .finish_non_exhaustive()
    }
}

impl Telegram {
    pub fn new(client: Client, token: SecretString, root_url: impl Into<String>) -> Self {
        Self {
            client,
            token,
            root_url: root_url.into(),
        }
    }

    fn method_url(&self, name: &str) -> String {
        format!(
            "{}/bot{}/{name}",
            self.root_url.trim_end_matches('/'),
            self.token.expose_secret()
        )
    }

    /// Call the Telegram Bot API method.
    #[instrument(skip_all, fields(method = M::NAME))]
    pub async fn call<M: Method>(&self, method: &M) -> Result<M::Response, TelegramError> {
        self.client
            .post(self.method_url(M::NAME))
            .json(method)
            .timeout(method.timeout())
            .send()
            .await?
            .json::<TelegramResult<M::Response>>()
            .await?
            .into()
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        self.call(&methods::SendMessage { chat_id, text }).await
    }

    pub async fn send_photo_url(
        &self,
        chat_id: i64,
        photo: &str,
        caption: &str,
    ) -> Result<Message, TelegramError> {
        self.call(&SendPhoto {
            chat_id,
            photo,
            caption: Some(caption),
        })
        .await
    }

    /// Upload a PNG with `sendPhoto`.
    #[instrument(skip_all, fields(chat_id = chat_id, size = png.len()))]
    pub async fn send_photo_bytes(
        &self,
        chat_id: i64,
        png: Bytes,
        caption: &str,
    ) -> Result<Message, TelegramError> {
        let photo = Part::bytes(png.to_vec())
            .file_name("cuaca.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);

        self.client
            .post(self.method_url(SendPhoto::NAME))
            .multipart(form)
            .timeout(DEFAULT_TIMEOUT * 2)
            .send()
            .await?
            .json::<TelegramResult<Message>>()
            .await?
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_ok() {
        // language=json
        let response: TelegramResult<u32> =
            serde_json::from_str(r#"{"ok": true, "result": 42}"#).unwrap();
        let result: Result<u32, TelegramError> = response.into();
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_response_error() {
        // language=json
        let response: TelegramResult<u32> = serde_json::from_str(
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#,
        )
        .unwrap();
        let result: Result<u32, TelegramError> = response.into();
        let error = result.unwrap_err();
        assert!(matches!(error, TelegramError::Api { error_code: 400, .. }));
        assert!(error.to_string().contains("chat not found"));
    }

    #[test]
    fn test_debug_hides_token() {
        let telegram = Telegram::new(
            Client::new(),
            SecretString::from("123:secret".to_string()),
            "https://api.telegram.org",
        );
        assert!(!format!("{telegram:?}").contains("secret"));
        assert_eq!(
            telegram.method_url("getMe"),
            "https://api.telegram.org/bot123:secret/getMe"
        );
    }
}
