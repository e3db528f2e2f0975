//! BMKG page image extraction
//!
//! BMKG publishes no stable JSON API, so a representative weather image is
//! pulled out of the page markup with an ordered heuristic; the first step
//! that yields a URL wins:
//!
//! 1. `og:image` meta content, else `twitter:image` meta content
//! 2. `link[rel="image_src"]` href
//! 3. the first `img` whose sources or alt text mention a weather keyword
//! 4. (optional) the first `img` whose source is a raster image file
//!
//! The ordering and keyword set are matched against what BMKG pages
//! actually serve; keep them stable.

use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::error::WeatherError;

const KEYWORDS: [&str; 6] = ["cuaca", "prakiraan", "forecast", "peta", "map", "kondisi"];
const RASTER_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];
const SOURCE_ATTRIBUTES: [&str; 3] = ["src", "data-src", "data-original"];

static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:image"]"#));
static TWITTER_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="twitter:image"]"#));
static IMAGE_SRC_LINK: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel="image_src"]"#));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css}: {e}"))
}

/// Finds a representative image on an authority page
#[async_trait]
pub trait ImageExtractor: Send + Sync {
    /// Absolute image URL for the page, or `None` when every heuristic failed
    async fn extract(&self, page_url: &str) -> Result<Option<String>, WeatherError>;
}

/// Optional extraction steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionPolicy {
    /// Fall back to the first raster `img` when no keyword candidate exists
    pub raster_fallback: bool,
}

/// Apply the extraction heuristic to a page; the returned URL may be relative
#[must_use]
pub fn extract_image_url(html: &str, policy: ExtractionPolicy) -> Option<String> {
    let document = Html::parse_document(html);

    first_attr(&document, &OG_IMAGE, "content")
        .or_else(|| first_attr(&document, &TWITTER_IMAGE, "content"))
        .or_else(|| first_attr(&document, &IMAGE_SRC_LINK, "href"))
        .or_else(|| keyword_candidate(&document))
        .or_else(|| {
            policy
                .raster_fallback
                .then(|| raster_candidate(&document))
                .flatten()
        })
}

/// Make an extracted URL absolute against the authority's origin
#[must_use]
pub fn absolutize(url: &str, origin: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{}{url}", origin.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| non_empty(element.value().attr(attr)))
        .map(str::to_string)
}

fn image_source(img: ElementRef<'_>) -> Option<String> {
    SOURCE_ATTRIBUTES
        .iter()
        .find_map(|attr| non_empty(img.value().attr(attr)))
        .map(str::to_string)
}

fn mentions_weather(img: ElementRef<'_>) -> bool {
    let sources: Vec<&str> = SOURCE_ATTRIBUTES
        .iter()
        .filter_map(|attr| non_empty(img.value().attr(attr)))
        .collect();
    let alt = img.value().attr("alt").unwrap_or_default();
    let haystack = format!("{} {alt}", sources.join(" ")).to_lowercase();
    KEYWORDS.iter().any(|keyword| haystack.contains(keyword))
}

// Only the first matching element counts, even if it has no usable source.
fn keyword_candidate(document: &Html) -> Option<String> {
    document
        .select(&IMG)
        .find(|img| mentions_weather(*img))
        .and_then(image_source)
}

fn raster_candidate(document: &Html) -> Option<String> {
    document.select(&IMG).filter_map(image_source).find(|src| {
        let lowered = src.to_lowercase();
        RASTER_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
    })
}

/// Scrapes BMKG pages over HTTP
#[derive(Debug, Clone)]
pub struct BmkgScraper {
    client: Client,
    base_origin: String,
    policy: ExtractionPolicy,
}

impl BmkgScraper {
    /// `client` must carry an identifying `User-Agent`; BMKG blocks anonymous clients
    pub fn new(client: Client, base_origin: impl Into<String>, policy: ExtractionPolicy) -> Self {
        Self {
            client,
            base_origin: base_origin.into(),
            policy,
        }
    }
}

#[async_trait]
impl ImageExtractor for BmkgScraper {
    #[instrument(skip(self))]
    async fn extract(&self, page_url: &str) -> Result<Option<String>, WeatherError> {
        debug!("Fetching authority page");
        let response = self.client.get(page_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Authority page request failed");
            return Err(WeatherError::upstream(format!(
                "BMKG page returned HTTP {status}"
            )));
        }

        let html = response.text().await?;
        let image_url =
            extract_image_url(&html, self.policy).map(|url| absolutize(&url, &self.base_origin));

        match &image_url {
            Some(url) => info!("Found BMKG image: {}", url),
            None => warn!("No image found on BMKG page"),
        }
        Ok(image_url)
    }
}
