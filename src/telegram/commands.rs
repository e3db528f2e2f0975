//! Chat command parsing

/// A bot command recognised in a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/cuaca`, with the free-text query when one was given
    Weather(Option<String>),
}

impl Command {
    /// Parse message text such as `/cuaca Bandung` or `/help@cuaca_bot`
    ///
    /// Commands addressed to a different bot are ignored when the own
    /// username is known.
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;
        let (head, argument) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(head, argument)| (head, argument.trim()));

        let name = match head.split_once('@') {
            Some((name, target)) => {
                if bot_username.is_some_and(|me| !me.eq_ignore_ascii_case(target)) {
                    return None;
                }
                name
            }
            None => head,
        };

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "cuaca" => Some(Self::Weather(
                (!argument.is_empty()).then(|| argument.to_string()),
            )),
            _ => None,
        }
    }
}
