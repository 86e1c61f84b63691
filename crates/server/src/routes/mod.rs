//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the Covercheck
//! server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `customers`: Customer directory
//! - `wordings`: Reference wording records
//! - `policies`: Policy upload and the review pipeline (extract/match/compare)
//! - `chat`: Policy-scoped question answering

pub mod chat;
pub mod customers;
pub mod health;
pub mod policies;
pub mod wordings;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Root endpoint (GET /), no authentication required.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Covercheck Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/customers",
            "/api/v1/wordings",
            "/api/v1/policies",
            "/api/v1/policies/{policy_id}/extract",
            "/api/v1/policies/{policy_id}/match",
            "/api/v1/policies/{policy_id}/compare",
            "/api/v1/policies/{policy_id}/analysis",
            "/api/v1/chat",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
