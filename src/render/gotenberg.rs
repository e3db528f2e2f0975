//! Chromium screenshots through a [Gotenberg](https://gotenberg.dev) service

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::{debug, instrument, warn};

use super::HtmlRenderer;
use crate::error::WeatherError;

const HTML_ROUTE: &str = "forms/chromium/screenshot/html";
const URL_ROUTE: &str = "forms/chromium/screenshot/url";

/// Viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Forecast card
    pub const CARD: Self = Self {
        width: 900,
        height: 420,
    };
    /// Full authority page
    pub const PAGE: Self = Self {
        width: 1200,
        height: 800,
    };
}

/// Renderer backed by Gotenberg's Chromium screenshot routes
#[derive(Debug, Clone)]
pub struct GotenbergRenderer {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GotenbergRenderer {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    fn route(&self, route: &str) -> String {
        format!("{}/{route}", self.base_url.trim_end_matches('/'))
    }

    fn screenshot_form(viewport: Viewport) -> Form {
        Form::new()
            .text("width", viewport.width.to_string())
            .text("height", viewport.height.to_string())
            .text("clip", "true")
            .text("format", "png")
    }

    async fn submit(&self, route: &str, form: Form) -> Result<Bytes, WeatherError> {
        let response = self
            .client
            .post(self.route(route))
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;
        Self::png_body(response).await
    }

    async fn png_body(response: Response) -> Result<Bytes, WeatherError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Screenshot request failed: {}", body);
            return Err(WeatherError::upstream(format!(
                "Renderer returned HTTP {status}"
            )));
        }
        let png = response.bytes().await?;
        debug!("Received {} byte screenshot", png.len());
        Ok(png)
    }
}

#[async_trait]
impl HtmlRenderer for GotenbergRenderer {
    #[instrument(skip(self, html), fields(html_len = html.len()))]
    async fn render_html(&self, html: &str) -> Result<Bytes, WeatherError> {
        let index = Part::text(html.to_string())
            .file_name("index.html")
            .mime_str("text/html")
            .map_err(|e| WeatherError::upstream(format!("Invalid MIME type: {e}")))?;
        let form = Self::screenshot_form(Viewport::CARD).part("files", index);
        self.submit(HTML_ROUTE, form).await
    }

    #[instrument(skip(self))]
    async fn screenshot_url(&self, url: &str) -> Result<Bytes, WeatherError> {
        let form = Self::screenshot_form(Viewport::PAGE).text("url", url.to_string());
        self.submit(URL_ROUTE, form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn renderer(server: &MockServer) -> GotenbergRenderer {
        GotenbergRenderer::new(Client::new(), server.uri(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn render_html_posts_index_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/forms/chromium/screenshot/html"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_MAGIC))
            .expect(1)
            .mount(&server)
            .await;

        let png = renderer(&server)
            .render_html("<html><body>hi</body></html>")
            .await
            .unwrap();
        assert_eq!(png.as_ref(), PNG_MAGIC);

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#"filename="index.html""#));
        assert!(body.contains("<body>hi</body>"));
        assert!(body.contains("900"));
    }

    #[tokio::test]
    async fn screenshot_url_sends_url_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/forms/chromium/screenshot/url"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_MAGIC))
            .expect(1)
            .mount(&server)
            .await;

        renderer(&server)
            .screenshot_url("https://www.bmkg.go.id/cuaca")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("https://www.bmkg.go.id/cuaca"));
    }

    #[tokio::test]
    async fn failed_render_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("chromium down"))
            .mount(&server)
            .await;

        let result = renderer(&server).render_html("<p/>").await;
        assert!(matches!(result, Err(WeatherError::Upstream { .. })));
    }
}
