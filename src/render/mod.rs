//! Card rendering
//!
//! [`card`] builds the HTML document; an [`HtmlRenderer`] turns HTML (or a
//! live page) into PNG bytes. Deployments without a renderer still serve
//! JSON and text, image endpoints report [`WeatherError::RenderUnavailable`].

pub mod card;
pub mod gotenberg;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

pub use card::{build_card_html, escape_html};
pub use gotenberg::GotenbergRenderer;

use crate::error::WeatherError;
use crate::models::{ForecastReport, Horizon};

/// Headless-browser screenshot collaborator
#[async_trait]
pub trait HtmlRenderer: Send + Sync {
    /// Render an HTML document to PNG
    async fn render_html(&self, html: &str) -> Result<Bytes, WeatherError>;

    /// Screenshot a live page to PNG
    async fn screenshot_url(&self, url: &str) -> Result<Bytes, WeatherError>;
}

/// Forecast card renderer with an optional backend
#[derive(Clone, Default)]
pub struct CardRenderer {
    renderer: Option<Arc<dyn HtmlRenderer>>,
}

impl CardRenderer {
    #[must_use]
    pub fn new(renderer: Option<Arc<dyn HtmlRenderer>>) -> Self {
        Self { renderer }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.renderer.is_some()
    }

    /// Render the forecast card to PNG
    pub async fn render(
        &self,
        report: &ForecastReport,
        horizon: Horizon,
    ) -> Result<Bytes, WeatherError> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or(WeatherError::RenderUnavailable)?;
        let html = build_card_html(report, horizon);
        debug!("Rendering card for {}", report.place.display_name);
        renderer.render_html(&html).await
    }
}

impl std::fmt::Debug for CardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardRenderer")
            .field("available", &self.is_available())
            .finish()
    }
}
