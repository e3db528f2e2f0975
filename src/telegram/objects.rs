use serde::Deserialize;

/// This object represents a Telegram user or bot.
///
/// See also: <https://core.telegram.org/bots/api#user>.
#[derive(Debug, Deserialize)]
#[must_use]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub username: Option<String>,
}

/// This object represents an incoming [update][1].
///
/// [1]: https://core.telegram.org/bots/api#update
#[derive(Debug, Deserialize)]
#[must_use]
pub struct Update {
    /// Update identifiers increase sequentially; the next poll starts after the last one seen.
    #[serde(rename = "update_id")]
    pub id: i64,

    #[serde(default)]
    pub message: Option<Message>,
}

/// This object represents a [message][1].
///
/// [1]: https://core.telegram.org/bots/api#message
#[derive(Debug, Deserialize)]
#[must_use]
pub struct Message {
    #[serde(rename = "message_id")]
    pub id: i64,

    pub chat: Chat,

    #[serde(default)]
    pub from: Option<User>,

    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[must_use]
pub struct Chat {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_with_message() {
        // language=json
        let update: Update = serde_json::from_str(
            r#"{"update_id": 10, "message": {"message_id": 5, "date": 0, "chat": {"id": -42, "type": "group"}, "from": {"id": 7, "is_bot": false, "first_name": "Ani"}, "text": "/cuaca Bogor"}}"#,
        )
        .unwrap();
        assert_eq!(update.id, 10);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, -42);
        assert_eq!(message.text.as_deref(), Some("/cuaca Bogor"));
    }

    #[test]
    fn test_parse_update_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 11, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }
}
