use crate::api::AppState;
use crate::error::Result;
use crate::metrics;
use crate::models::{InboundEvent, PipelineOutcome};
use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Prometheus text exposition
pub async fn metrics_export() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Receive a qTest test-log webhook and run the enrichment pipeline.
///
/// Always answers 200 once the payload parsed: skipped and failed runs are
/// reported in the body, not as HTTP errors, so qTest never retries them.
pub async fn receive_testlog(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Json<PipelineOutcome> {
    Json(state.pipeline.process(&event).await)
}
