//! Weather resolution pipeline
//!
//! One `resolve` call turns a user query into a [`WeatherResult`]. Queries
//! that point at the weather authority's website are answered with an image
//! scraped from that page; everything else is geocoded and forecast. Both
//! delivery surfaces share this pipeline and differ only in [`PipelineOptions`]
//! and the extraction policy of the injected extractor.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::bmkg::ImageExtractor;
use crate::error::{ErrorReason, WeatherError};
use crate::location_resolver::Geocoder;
use crate::models::result::{NO_IMAGE_FOUND, SCREENSHOT_FAILED, SCREENSHOT_UNAVAILABLE};
use crate::models::{BmkgImage, ForecastReport, Horizon, QueryKind, WeatherResult};
use crate::render::HtmlRenderer;
use crate::weather::ForecastProvider;

/// Default host fragment identifying authority pages
pub const DEFAULT_AUTHORITY_HOST: &str = "bmkg.go.id";

/// Per-surface pipeline behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Host fragment a URL query must contain to be treated as an authority page
    pub authority_host: String,
    /// Screenshot the page when no image could be extracted
    pub screenshot_fallback: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            screenshot_fallback: false,
        }
    }
}

/// Stateless query resolver over injected collaborators
#[derive(Clone)]
pub struct WeatherPipeline {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastProvider>,
    extractor: Arc<dyn ImageExtractor>,
    renderer: Option<Arc<dyn HtmlRenderer>>,
    options: PipelineOptions,
}

impl WeatherPipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastProvider>,
        extractor: Arc<dyn ImageExtractor>,
        renderer: Option<Arc<dyn HtmlRenderer>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            extractor,
            renderer,
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Resolve a query into an image, a forecast or a logical error
    ///
    /// Logical failures (unknown location, forecast without current
    /// conditions) come back as [`WeatherResult::Error`]; transport and parse
    /// failures are returned as `Err`.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        query: &str,
        horizon: Horizon,
    ) -> Result<WeatherResult, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::invalid_input("Query cannot be empty"));
        }

        let start_time = Instant::now();
        let result = match QueryKind::classify(query, &self.options.authority_host) {
            QueryKind::AuthorityPage => self.resolve_page(query).await?,
            QueryKind::Location => self.resolve_location(query, horizon).await?,
        };

        info!(
            "Resolved '{}' in {:.3}s",
            query,
            start_time.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    async fn resolve_page(&self, page_url: &str) -> Result<WeatherResult, WeatherError> {
        if let Some(image_url) = self.extractor.extract(page_url).await? {
            return Ok(WeatherResult::Bmkg(BmkgImage::found(image_url)));
        }

        if !self.options.screenshot_fallback {
            return Ok(WeatherResult::Bmkg(BmkgImage::missing(NO_IMAGE_FOUND)));
        }

        let Some(renderer) = &self.renderer else {
            warn!("No renderer configured for page screenshot");
            return Ok(WeatherResult::Bmkg(BmkgImage::missing(
                SCREENSHOT_UNAVAILABLE,
            )));
        };

        let image = match renderer.screenshot_url(page_url).await {
            Ok(png) => BmkgImage {
                screenshot: Some(png),
                ..BmkgImage::missing(NO_IMAGE_FOUND)
            },
            Err(e) => {
                warn!("Page screenshot failed: {}", e);
                BmkgImage::missing(SCREENSHOT_FAILED)
            }
        };
        Ok(WeatherResult::Bmkg(image))
    }

    async fn resolve_location(
        &self,
        query: &str,
        horizon: Horizon,
    ) -> Result<WeatherResult, WeatherError> {
        let Some(place) = self.geocoder.lookup(query).await? else {
            return Ok(WeatherResult::Error {
                reason: ErrorReason::NotFound,
            });
        };

        match self.forecast.fetch(&place, horizon).await {
            Ok(forecast) => Ok(WeatherResult::Forecast(ForecastReport::new(
                place,
                forecast.current,
                forecast.daily,
            ))),
            Err(WeatherError::MissingCurrentConditions) => Ok(WeatherResult::Error {
                reason: ErrorReason::UpstreamFailure,
            }),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for WeatherPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherPipeline")
            .field("options", &self.options)
            .field("renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentConditions, DailyForecastSeries, Forecast, ResolvedPlace};
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn lookup(&self, query: &str) -> Result<Option<ResolvedPlace>, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match query {
                "Jakarta" => Some(ResolvedPlace::new(
                    "Jakarta, Indonesia",
                    "-6.1753942",
                    "106.827183",
                )),
                "Kutub" => Some(ResolvedPlace::new("Kutub", "90", "0")),
                _ => None,
            })
        }
    }

    #[derive(Default)]
    struct FakeForecast {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ForecastProvider for FakeForecast {
        async fn fetch(
            &self,
            place: &ResolvedPlace,
            horizon: Horizon,
        ) -> Result<Forecast, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if place.display_name == "Kutub" {
                return Err(WeatherError::MissingCurrentConditions);
            }
            let daily: DailyForecastSeries = serde_json::from_value(json!({
                "time": ["2024-11-13", "2024-11-14", "2024-11-15", "2024-11-16", "2024-11-17", "2024-11-18", "2024-11-19"],
                "weathercode": [0, 1, 2, 3, 61, 63, 95],
            }))
            .unwrap();
            Ok(Forecast {
                current: CurrentConditions {
                    temperature: 30.2,
                    wind_speed: 6.5,
                    wind_direction: 45.0,
                    weather_code: 0,
                    time: None,
                    is_day: None,
                },
                daily: daily.truncated(horizon),
            })
        }
    }

    struct FakeExtractor {
        calls: AtomicUsize,
        image: Option<String>,
    }

    impl FakeExtractor {
        fn returning(image: Option<&str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                image: image.map(str::to_string),
            }
        }
    }

    #[async_trait]
    impl ImageExtractor for FakeExtractor {
        async fn extract(&self, _page_url: &str) -> Result<Option<String>, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.image.clone())
        }
    }

    struct FakeRenderer {
        fail: bool,
    }

    #[async_trait]
    impl HtmlRenderer for FakeRenderer {
        async fn render_html(&self, _html: &str) -> Result<Bytes, WeatherError> {
            Ok(Bytes::from_static(b"card"))
        }

        async fn screenshot_url(&self, _url: &str) -> Result<Bytes, WeatherError> {
            if self.fail {
                Err(WeatherError::upstream("chromium crashed"))
            } else {
                Ok(Bytes::from_static(b"page"))
            }
        }
    }

    struct Harness {
        geocoder: Arc<FakeGeocoder>,
        forecast: Arc<FakeForecast>,
        extractor: Arc<FakeExtractor>,
        pipeline: WeatherPipeline,
    }

    fn harness(
        image: Option<&str>,
        renderer: Option<FakeRenderer>,
        screenshot_fallback: bool,
    ) -> Harness {
        let geocoder = Arc::new(FakeGeocoder::default());
        let forecast = Arc::new(FakeForecast::default());
        let extractor = Arc::new(FakeExtractor::returning(image));
        let renderer = renderer.map(|r| Arc::new(r) as Arc<dyn HtmlRenderer>);
        let pipeline = WeatherPipeline::new(
            geocoder.clone(),
            forecast.clone(),
            extractor.clone(),
            renderer,
            PipelineOptions {
                screenshot_fallback,
                ..PipelineOptions::default()
            },
        );
        Harness {
            geocoder,
            forecast,
            extractor,
            pipeline,
        }
    }

    #[tokio::test]
    async fn location_query_yields_forecast() {
        let h = harness(None, None, false);
        let result = h.pipeline.resolve("Jakarta", Horizon::new(3)).await.unwrap();

        let WeatherResult::Forecast(report) = result else {
            panic!("expected forecast, got {result:?}");
        };
        assert_eq!(report.place.display_name, "Jakarta, Indonesia");
        assert_eq!(report.summary.icon, "01d");
        assert_eq!(report.summary.description, "Cerah");
        assert_eq!(report.daily.len(), 3);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let h = harness(None, None, false);
        let result = h.pipeline.resolve("Zzzznotaplace", Horizon::default()).await.unwrap();
        assert!(matches!(
            result,
            WeatherResult::Error {
                reason: ErrorReason::NotFound
            }
        ));
        assert_eq!(h.forecast.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_current_conditions_is_upstream_failure() {
        let h = harness(None, None, false);
        let result = h.pipeline.resolve("Kutub", Horizon::default()).await.unwrap();
        assert!(matches!(
            result,
            WeatherResult::Error {
                reason: ErrorReason::UpstreamFailure
            }
        ));
    }

    #[tokio::test]
    async fn blank_query_makes_no_calls() {
        let h = harness(None, None, false);
        let result = h.pipeline.resolve("  \t ", Horizon::default()).await;
        assert!(matches!(result, Err(WeatherError::InvalidInput { .. })));
        assert_eq!(h.geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn authority_page_never_geocodes() {
        let h = harness(Some("https://www.bmkg.go.id/img/peta.png"), None, false);
        let result = h
            .pipeline
            .resolve("https://www.bmkg.go.id/cuaca/prakiraan", Horizon::default())
            .await
            .unwrap();

        let WeatherResult::Bmkg(image) = result else {
            panic!("expected bmkg image, got {result:?}");
        };
        assert_eq!(
            image.image_url.as_deref(),
            Some("https://www.bmkg.go.id/img/peta.png")
        );
        assert_eq!(h.geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.forecast.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_authority_url_is_geocoded() {
        let h = harness(Some("unused"), None, false);
        let result = h
            .pipeline
            .resolve("https://example.com/bmkg", Horizon::default())
            .await
            .unwrap();
        assert!(matches!(result, WeatherResult::Error { .. }));
        assert_eq!(h.geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn page_without_image_reports_diagnostic() {
        let h = harness(None, Some(FakeRenderer { fail: false }), false);
        let result = h
            .pipeline
            .resolve("https://www.bmkg.go.id/", Horizon::default())
            .await
            .unwrap();
        let WeatherResult::Bmkg(image) = result else {
            panic!("expected bmkg image");
        };
        assert_eq!(image.image_url, None);
        assert_eq!(image.diagnostic.as_deref(), Some(NO_IMAGE_FOUND));
        assert!(image.screenshot.is_none());
    }

    #[tokio::test]
    async fn screenshot_fallback_captures_page() {
        let h = harness(None, Some(FakeRenderer { fail: false }), true);
        let WeatherResult::Bmkg(image) = h
            .pipeline
            .resolve("https://www.bmkg.go.id/", Horizon::default())
            .await
            .unwrap()
        else {
            panic!("expected bmkg image");
        };
        assert_eq!(image.screenshot.as_deref(), Some(&b"page"[..]));
        assert_eq!(image.diagnostic.as_deref(), Some(NO_IMAGE_FOUND));
    }

    #[tokio::test]
    async fn screenshot_fallback_failure() {
        let h = harness(None, Some(FakeRenderer { fail: true }), true);
        let WeatherResult::Bmkg(image) = h
            .pipeline
            .resolve("https://www.bmkg.go.id/", Horizon::default())
            .await
            .unwrap()
        else {
            panic!("expected bmkg image");
        };
        assert!(image.screenshot.is_none());
        assert_eq!(image.diagnostic.as_deref(), Some(SCREENSHOT_FAILED));
    }

    #[tokio::test]
    async fn screenshot_fallback_without_renderer() {
        let h = harness(None, None, true);
        let WeatherResult::Bmkg(image) = h
            .pipeline
            .resolve("https://www.bmkg.go.id/", Horizon::default())
            .await
            .unwrap()
        else {
            panic!("expected bmkg image");
        };
        assert_eq!(image.diagnostic.as_deref(), Some(SCREENSHOT_UNAVAILABLE));
    }
}
