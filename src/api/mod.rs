//! JSON and image endpoints under `/api`

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::{
    error::{ErrorReason, WeatherError},
    models::{BmkgImage, Horizon, WeatherResult},
    pipeline::WeatherPipeline,
    render::CardRenderer,
};

const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: WeatherPipeline,
    pub cards: CardRenderer,
    /// Client used to proxy authority images
    pub client: Client,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub q: Option<String>,
    pub days: Option<String>,
}

impl WeatherQuery {
    fn query(&self) -> Result<&str, ApiError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(ApiError::MissingQuery)
    }

    fn horizon(&self) -> Horizon {
        Horizon::parse(self.days.as_deref())
    }
}

/// Failure responses of the API
#[derive(Debug)]
pub enum ApiError {
    MissingQuery,
    Logical(ErrorReason),
    NoBmkgImage,
    RendererUnavailable,
    Internal(WeatherError),
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::InvalidInput { .. } => Self::MissingQuery,
            WeatherError::RenderUnavailable => Self::RendererUnavailable,
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::MissingQuery => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "q parameter required" }),
            ),
            Self::Logical(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": reason.as_str() }),
            ),
            Self::NoBmkgImage => (StatusCode::NOT_FOUND, json!({ "error": "no-bmkg-image" })),
            Self::RendererUnavailable => (
                StatusCode::NOT_IMPLEMENTED,
                json!({
                    "error": "renderer-unavailable",
                    "message": "Server-side PNG generation requires a renderer. Set render.gotenberg_url to enable this feature."
                }),
            ),
            Self::Internal(err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error", "detail": err.to_string() }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cuaca", get(get_weather))
        .route("/card", get(get_card))
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherResult>, ApiError> {
    let query = params.query()?;
    match state.pipeline.resolve(query, params.horizon()).await? {
        WeatherResult::Error { reason } => Err(ApiError::Logical(reason)),
        result => Ok(Json(result)),
    }
}

async fn get_card(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Response, ApiError> {
    let query = params.query()?;
    let horizon = params.horizon();

    match state.pipeline.resolve(query, horizon).await? {
        WeatherResult::Bmkg(image) => bmkg_image(&state.client, image).await,
        WeatherResult::Forecast(report) => {
            let png = state.cards.render(&report, horizon).await?;
            Ok(png_response(png))
        }
        WeatherResult::Error { reason } => Err(ApiError::Logical(reason)),
    }
}

async fn bmkg_image(client: &Client, image: BmkgImage) -> Result<Response, ApiError> {
    if let Some(url) = image.image_url {
        let upstream = client.get(&url).send().await.map_err(WeatherError::from)?;
        let status = upstream.status();
        if !status.is_success() {
            warn!(%status, "Proxied image request failed: {}", url);
            return Err(WeatherError::upstream(format!("Image request returned HTTP {status}")).into());
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_IMAGE_TYPE)
            .to_string();
        let body = upstream.bytes().await.map_err(WeatherError::from)?;
        return Ok(([(header::CONTENT_TYPE, content_type)], body).into_response());
    }

    match image.screenshot {
        Some(png) => Ok(png_response(png)),
        None => Err(ApiError::NoBmkgImage),
    }
}

fn png_response(png: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], png).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("   "), true)]
    #[case(Some("Bandung"), false)]
    fn test_missing_query(#[case] q: Option<&str>, #[case] missing: bool) {
        let params = WeatherQuery {
            q: q.map(str::to_string),
            days: None,
        };
        assert_eq!(matches!(params.query(), Err(ApiError::MissingQuery)), missing);
    }

    #[rstest]
    #[case(WeatherError::invalid_input("x"), StatusCode::BAD_REQUEST)]
    #[case(WeatherError::RenderUnavailable, StatusCode::NOT_IMPLEMENTED)]
    #[case(WeatherError::upstream("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_error_status(#[case] err: WeatherError, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(err).into_response().status(), expected);
    }

    #[test]
    fn test_logical_error_status() {
        let response = ApiError::Logical(ErrorReason::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::NoBmkgImage.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
