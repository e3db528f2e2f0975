//! Long-polling weather bot

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    models::{
        BmkgImage, ForecastReport, Horizon, WeatherResult,
        result::{SCREENSHOT_FAILED, SCREENSHOT_UNAVAILABLE},
    },
    pipeline::WeatherPipeline,
    render::CardRenderer,
    telegram::{
        Command, Telegram, TelegramError,
        methods::{DeleteMessage, EditMessageText, GetMe, GetUpdates},
        objects::Update,
    },
    weather::codes,
};

const GREETING: &str =
    "Halo! Saya bot cuaca sederhana. Gunakan /cuaca <lokasi> untuk melihat cuaca. Contoh: /cuaca Jakarta";
const HELP: &str = "/cuaca <lokasi> - tampilkan cuaca saat ini untuk lokasi yang diberikan.\n/start - mulai percakapan.";
const USAGE: &str = "Gunakan: /cuaca <kota atau alamat>. Contoh: /cuaca Bandung";
const SCREENSHOT_UNAVAILABLE_NOTICE: &str =
    "Fitur screenshot tidak tersedia karena renderer belum dikonfigurasi.";
const SCREENSHOT_FAILED_NOTICE: &str = "Gagal mengambil gambar atau screenshot dari halaman BMKG.";
const NO_IMAGE_NOTICE: &str = "Tidak ada gambar cuaca yang ditemukan di halaman BMKG.";

/// Pause after a failed poll before asking again
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// How a reply reached the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    /// A new message was sent; the status message is obsolete
    Sent,
    /// The status message itself now carries the reply
    StatusEdited,
}

/// Telegram front end of the weather pipeline
#[derive(Debug, Clone)]
pub struct WeatherBot {
    telegram: Telegram,
    pipeline: WeatherPipeline,
    cards: CardRenderer,
    poll_timeout_secs: u64,
    username: Option<String>,
}

impl WeatherBot {
    pub fn new(
        telegram: Telegram,
        pipeline: WeatherPipeline,
        cards: CardRenderer,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            telegram,
            pipeline,
            cards,
            poll_timeout_secs,
            username: None,
        }
    }

    /// Poll for updates until Ctrl-C; every message is handled on its own task
    pub async fn run(mut self) -> Result<()> {
        let me = self
            .telegram
            .call(&GetMe)
            .await
            .context("Failed to authenticate with the Telegram Bot API")?;
        info!(id = me.id, username = ?me.username, "Bot started, waiting for commands");
        self.username = me.username;

        let mut offset = None;
        loop {
            let poll = GetUpdates::messages(offset, self.poll_timeout_secs);
            let updates = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down bot");
                    return Ok(());
                }
                updates = self.telegram.call(&poll) => updates,
            };

            match updates {
                Ok(updates) => {
                    offset = updates.last().map(|last| last.id + 1).or(offset);
                    debug!(n = updates.len(), ?offset, "Received Telegram updates");
                    for update in updates {
                        let bot = self.clone();
                        tokio::spawn(async move { bot.handle_update(update).await });
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(POLL_ERROR_PAUSE).await;
                }
            }
        }
    }

    /// Dispatch one update; failures are logged, never propagated
    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let Some(command) = Command::parse(text, self.username.as_deref()) else {
            return;
        };

        let chat_id = message.chat.id;
        let outcome = match command {
            Command::Start => self.notify(chat_id, GREETING).await,
            Command::Help => self.notify(chat_id, HELP).await,
            Command::Weather(None) => self.notify(chat_id, USAGE).await,
            Command::Weather(Some(query)) => {
                self.handle_weather(chat_id, &query).await;
                return;
            }
        };
        if let Err(e) = outcome {
            error!(chat_id, "Failed to reply: {}", e);
        }
    }

    #[instrument(skip(self))]
    async fn handle_weather(&self, chat_id: i64, query: &str) {
        let status_id = match self
            .telegram
            .send_message(chat_id, &format!("Mencari lokasi \"{query}\"..."))
            .await
        {
            Ok(message) => Some(message.id),
            Err(e) => {
                warn!("Failed to send status message: {}", e);
                None
            }
        };

        let outcome = match self.pipeline.resolve(query, Horizon::default()).await {
            Ok(result) => self.reply(chat_id, status_id, query, result).await,
            Err(e) => {
                error!("Weather lookup failed: {}", e);
                self.notify(chat_id, &e.user_message()).await
            }
        };

        match outcome {
            Ok(Reply::Sent) => {
                if let Some(message_id) = status_id {
                    let delete = DeleteMessage {
                        chat_id,
                        message_id,
                    };
                    if let Err(e) = self.telegram.call(&delete).await {
                        debug!("Failed to delete status message: {}", e);
                    }
                }
            }
            Ok(Reply::StatusEdited) => {}
            Err(e) => error!("Failed to deliver weather reply: {}", e),
        }
    }

    async fn reply(
        &self,
        chat_id: i64,
        status_id: Option<i64>,
        query: &str,
        result: WeatherResult,
    ) -> Result<Reply, TelegramError> {
        match result {
            WeatherResult::Bmkg(image) => self.reply_bmkg(chat_id, status_id, query, image).await,
            WeatherResult::Forecast(report) => {
                self.reply_forecast(chat_id, status_id, &report).await
            }
            WeatherResult::Error { reason } => {
                info!("Lookup ended with '{}'", reason.as_str());
                self.notify(chat_id, reason.user_message()).await
            }
        }
    }

    async fn reply_bmkg(
        &self,
        chat_id: i64,
        status_id: Option<i64>,
        query: &str,
        image: BmkgImage,
    ) -> Result<Reply, TelegramError> {
        let sent = if let Some(url) = &image.image_url {
            self.telegram
                .send_photo_url(chat_id, url, &format!("Gambar dari BMKG: {query}"))
                .await
        } else if let Some(png) = image.screenshot {
            self.telegram
                .send_photo_bytes(chat_id, png, &format!("Screenshot halaman BMKG: {query}"))
                .await
        } else {
            let notice = match image.diagnostic.as_deref() {
                Some(SCREENSHOT_UNAVAILABLE) => SCREENSHOT_UNAVAILABLE_NOTICE,
                Some(SCREENSHOT_FAILED) => SCREENSHOT_FAILED_NOTICE,
                _ => NO_IMAGE_NOTICE,
            };
            return self.edit_status(chat_id, status_id, notice).await;
        };

        match sent {
            Ok(_) => Ok(Reply::Sent),
            Err(e) => {
                warn!("Failed to send BMKG photo: {}", e);
                self.edit_status(chat_id, status_id, SCREENSHOT_FAILED_NOTICE)
                    .await
            }
        }
    }

    /// Card photo, else the condition icon, else the plain text summary
    async fn reply_forecast(
        &self,
        chat_id: i64,
        status_id: Option<i64>,
        report: &ForecastReport,
    ) -> Result<Reply, TelegramError> {
        let caption = report.text_summary();

        match self.cards.render(report, Horizon::default()).await {
            Ok(png) => match self.send_card(chat_id, png, &caption).await {
                Ok(()) => return Ok(Reply::Sent),
                Err(e) => warn!("Failed to send card: {}", e),
            },
            Err(e) if self.cards.is_available() => warn!("Card render failed: {}", e),
            Err(_) => debug!("No renderer configured, sending icon"),
        }

        let icon = codes::icon_url(report.current.weather_code, 4);
        match self.telegram.send_photo_url(chat_id, &icon, &caption).await {
            Ok(_) => Ok(Reply::Sent),
            Err(e) => {
                warn!("Failed to send icon photo: {}", e);
                self.edit_status(chat_id, status_id, &caption).await
            }
        }
    }

    async fn send_card(&self, chat_id: i64, png: Bytes, caption: &str) -> Result<(), TelegramError> {
        self.telegram
            .send_photo_bytes(chat_id, png, caption)
            .await
            .map(|_| ())
    }

    async fn notify(&self, chat_id: i64, text: &str) -> Result<Reply, TelegramError> {
        self.telegram.send_message(chat_id, text).await?;
        Ok(Reply::Sent)
    }

    /// Replace the status message text, or send a new message when there is none
    async fn edit_status(
        &self,
        chat_id: i64,
        status_id: Option<i64>,
        text: &str,
    ) -> Result<Reply, TelegramError> {
        let Some(message_id) = status_id else {
            return self.notify(chat_id, text).await;
        };
        self.telegram
            .call(&EditMessageText {
                chat_id,
                message_id,
                text,
            })
            .await?;
        Ok(Reply::StatusEdited)
    }
}
