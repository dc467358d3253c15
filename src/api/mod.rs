//! HTTP API
//!
//! `GET /predictions?d=YYYY-MM-DD` serves a day's predictions from the cache;
//! `POST /refresh` warms today + N days and is gated by the `X-CRON-TOKEN`
//! header.

use crate::error::PredictError;
use crate::persist;
use crate::service::{today, PredictionService};
use crate::types::{parse_date, Prediction};
use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

pub const CRON_TOKEN_HEADER: &str = "x-cron-token";

const DEFAULT_REFRESH_DAYS: u32 = 3;

/// State shared across handlers
pub struct ApiState {
    pub service: Arc<PredictionService>,
    pub cron_token: Option<String>,
    pub max_warm_days: u32,
    pub persist_path: Option<PathBuf>,
}

/// Error body mirrors `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        let status = match err {
            PredictError::InvalidDate(_) | PredictError::InvalidRate(_) => StatusCode::BAD_REQUEST,
            PredictError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictionsQuery {
    /// `YYYY-MM-DD`; defaults to today (UTC)
    pub d: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    #[serde(default = "default_refresh_days")]
    pub days: u32,
    /// Recompute dates that are already cached
    #[serde(default)]
    pub force: bool,
}

fn default_refresh_days() -> u32 {
    DEFAULT_REFRESH_DAYS
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub ok: bool,
    pub warmed_days: u32,
    pub predictions: usize,
}

// ============ HTTP API Handlers ============

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "FootyPredict API",
        "utc": Utc::now().to_rfc3339(),
    }))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Predictions for one day
pub async fn get_predictions(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PredictionsQuery>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    let date = match query.d.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let predictions = state.service.get_predictions(date).await;
    Ok(Json(predictions.as_ref().clone()))
}

/// Warm (or force-refresh) today + `days`
pub async fn refresh(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Some(expected) = state.cron_token.as_deref() else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "CRON_TOKEN not configured on server",
        ));
    };
    let supplied = headers
        .get(CRON_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if supplied != Some(expected) {
        return Err(PredictError::Unauthorized.into());
    }
    if query.days > state.max_warm_days {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("days must be between 0 and {}", state.max_warm_days),
        ));
    }

    let start = today();
    let summary = if query.force {
        state.service.refresh_range(start, query.days).await
    } else {
        state.service.warm(start, query.days).await
    };

    if let Some(path) = state.persist_path.clone() {
        let cache = state.service.cache().clone();
        if let Err(e) =
            tokio::task::spawn_blocking(move || persist::save_from(&cache, &path)).await
        {
            tracing::warn!("Cache persistence task failed: {}", e);
        }
    }

    Ok(Json(RefreshResponse {
        ok: true,
        warmed_days: query.days,
        predictions: summary.predictions,
    }))
}

/// Adds CORS headers to every response and answers preflight requests
async fn cors(State(origin): State<HeaderValue>, req: Request, next: Next) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    resp
}

/// Create API router
pub fn create_router(state: Arc<ApiState>, cors_origin: &str) -> Router {
    let origin = HeaderValue::from_str(cors_origin).unwrap_or(HeaderValue::from_static("*"));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/predictions", get(get_predictions))
        .route("/refresh", post(refresh))
        .with_state(state)
        .layer(middleware::from_fn_with_state(origin, cors))
}

/// Start API server
pub async fn start_server(
    state: Arc<ApiState>,
    host: &str,
    port: u16,
    cors_origin: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state, cors_origin);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("API server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
