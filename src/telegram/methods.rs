use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::telegram::objects::{Message, Update, User};

/// Per-request timeout for ordinary Bot API calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Telegram bot API method.
pub trait Method: Serialize + Sync {
    /// Method name.
    const NAME: &'static str;

    type Response: DeserializeOwned;

    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }
}

/// A simple method for testing your bot's authentication token.
///
/// See also: <https://core.telegram.org/bots/api#getme>.
#[derive(Serialize)]
#[must_use]
pub struct GetMe;

impl Method for GetMe {
    const NAME: &'static str = "getMe";

    type Response = User;
}

/// Use this method to receive incoming updates using long polling. Returns an `Array` of `Update` objects.
#[derive(Serialize)]
#[must_use]
pub struct GetUpdates {
    /// Identifier of the first update to be returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Timeout in seconds for long polling.
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,

    pub allowed_updates: &'static [&'static str],
}

impl GetUpdates {
    pub const fn messages(offset: Option<i64>, timeout_secs: u64) -> Self {
        Self {
            offset,
            timeout_secs,
            allowed_updates: &["message"],
        }
    }
}

impl Method for GetUpdates {
    const NAME: &'static str = "getUpdates";

    type Response = Vec<Update>;

    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT + Duration::from_secs(self.timeout_secs)
    }
}

/// [Send a message][1].
///
/// [1]: https://core.telegram.org/bots/api#sendmessage
#[derive(Serialize)]
#[must_use]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

impl Method for SendMessage<'_> {
    const NAME: &'static str = "sendMessage";
    type Response = Message;
}

/// [Edit the text][1] of a previously sent message.
///
/// [1]: https://core.telegram.org/bots/api#editmessagetext
#[derive(Serialize)]
#[must_use]
pub struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
}

impl Method for EditMessageText<'_> {
    const NAME: &'static str = "editMessageText";
    type Response = serde_json::Value;
}

/// [Delete a message][1].
///
/// [1]: https://core.telegram.org/bots/api#deletemessage
#[derive(Serialize)]
#[must_use]
pub struct DeleteMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

impl Method for DeleteMessage {
    const NAME: &'static str = "deleteMessage";
    type Response = bool;
}

/// [Send a photo][1] that Telegram downloads from a URL.
///
/// Uploads go through [`crate::telegram::Telegram::send_photo_bytes`].
///
/// [1]: https://core.telegram.org/bots/api#sendphoto
#[derive(Serialize)]
#[must_use]
pub struct SendPhoto<'a> {
    pub chat_id: i64,
    pub photo: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'a str>,
}

impl Method for SendPhoto<'_> {
    const NAME: &'static str = "sendPhoto";
    type Response = Message;
}
