use crate::error::ServerResult;
use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use once_cell::sync::OnceCell;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Prometheus recorder handle, installed once at server startup.
pub(crate) static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "covercheck-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
/// Returns 200 if server is ready to accept requests
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    // The store is the only stateful component; a cheap scan proves it is
    // reachable.
    let store_status = match state.store.list_customers() {
        Ok(_) => "ready",
        Err(_) => "unavailable",
    };

    Ok(Json(json!({
        "status": if store_status == "ready" { "ready" } else { "degraded" },
        "service": "covercheck-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": store_status,
        }
    })))
}

/// Prometheus metrics endpoint
pub async fn metrics() -> ServerResult<impl IntoResponse> {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => Ok(handle.render().into_response()),
        None => Ok(Json(json!({
            "uptime_seconds": uptime_seconds(),
        }))
        .into_response()),
    }
}

/// Server metadata endpoint (authenticated)
pub async fn server_metadata(
    State(_state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let metadata = ServerMetadata {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(),
    };

    Ok(Json(serde_json::to_value(metadata)?))
}

/// Pipeline status response
#[derive(serde::Serialize)]
pub struct PipelineStatusResponse {
    pub status: String,
    pub components: PipelineComponents,
}

/// Pipeline component status
#[derive(serde::Serialize)]
pub struct PipelineComponents {
    pub ingest: String,
    pub extract: String,
    pub matcher: String,
    pub compare: String,
    pub chat: String,
    pub store: String,
}

/// Get pipeline/component status
pub async fn pipeline_status(
    State(_state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    Ok(Json(PipelineStatusResponse {
        status: "ready".to_string(),
        components: PipelineComponents {
            ingest: "ready".to_string(),
            extract: "ready".to_string(),
            matcher: "ready".to_string(),
            compare: "ready".to_string(),
            chat: "ready".to_string(),
            store: "ready".to_string(),
        },
    }))
}
