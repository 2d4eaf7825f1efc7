//! HTTP surface: trigger, liveness and metrics
//!
//! | Route              | Response                                   |
//! |--------------------|--------------------------------------------|
//! | `GET /extract`     | `RunSummary` JSON, or plain-text error     |
//! | `GET /health`      | `{"status":"ok"}`                          |
//! | `GET /metrics`     | Prometheus text exposition                 |

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use extractor_common::RunSummary;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::ExtractError,
    extract::{ExtractRequest, Extractor},
    middleware,
};

const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
}

impl AppState {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// Raw trigger parameters. Kept as strings so malformed values reach
/// validation and produce its messages instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractParams {
    pub n: Option<String>,
    pub date: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/extract", get(extract))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(middleware::tracing_layer())
}

/// Responds once the run has finished. The run itself is spawned, so a client
/// that disconnects early does not cut it short.
async fn extract(
    State(state): State<AppState>,
    Query(params): Query<ExtractParams>,
) -> Result<Json<RunSummary>, ExtractError> {
    let request = ExtractRequest::parse(params.n.as_deref(), params.date.as_deref())?;

    let extractor = state.extractor.clone();
    let summary = tokio::spawn(async move { extractor.run(request).await })
        .await
        .map_err(|e| ExtractError::Aborted(e.to_string()))??;

    Ok(Json(summary))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.extractor.metrics().render(),
    )
}
