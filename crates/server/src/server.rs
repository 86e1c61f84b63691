//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, compression, etc.)
//! - Prometheus recorder installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{chat, customers, health, policies, wordings};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: /, /health, /ready, /metrics (no auth required)
/// - Protected routes: All /api/v1/* endpoints (API key required)
fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics));

    // Protected routes (require API key)
    let protected_routes = Router::new()
        // Customers
        .route(
            "/api/v1/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        // Wordings
        .route(
            "/api/v1/wordings",
            post(wordings::create_wording).get(wordings::list_wordings),
        )
        .route("/api/v1/wordings/{wording_id}", get(wordings::get_wording))
        // Policies and the review pipeline
        .route(
            "/api/v1/policies",
            post(policies::upload_policy).get(policies::list_policies),
        )
        .route("/api/v1/policies/{policy_id}", get(policies::get_policy))
        .route(
            "/api/v1/policies/{policy_id}/extract",
            post(policies::extract_policy),
        )
        .route(
            "/api/v1/policies/{policy_id}/match",
            post(policies::match_policy),
        )
        .route(
            "/api/v1/policies/{policy_id}/compare",
            post(policies::compare_policy),
        )
        .route(
            "/api/v1/policies/{policy_id}/analysis",
            get(policies::get_analyses),
        )
        // Chat
        .route("/api/v1/chat", post(chat::chat))
        // Pipeline status + metadata
        .route("/api/v1/pipeline/status", get(health::pipeline_status))
        .route("/api/v1/metadata", get(health::server_metadata))
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        // Add auth middleware
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Covercheck HTTP server
///
/// Initializes logging, metrics, shared state, and the router, then blocks
/// until the server shuts down via SIGTERM or Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    // Install the Prometheus recorder once; the /metrics route renders it.
    if config.metrics_enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = health::PROMETHEUS_HANDLE.set(handle);
            }
            Err(err) => tracing::warn!(error = %err, "failed to install metrics recorder"),
        }
    }

    // Create server state
    let state = Arc::new(ServerState::new(config.clone())?);

    // Build router
    let app = build_router(state);

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting Covercheck server on {} with {} API keys",
        addr,
        config.api_keys.len()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB",
        config.timeout_secs,
        config.max_body_size_mb
    );
    tracing::info!(
        "Rate limit: {} requests/minute",
        config.rate_limit_per_minute
    );
    tracing::info!(
        "Store: {}, LLM mode: {}",
        config.store_path.as_deref().unwrap_or("in-memory"),
        config.llm.mode
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn test_state() -> Arc<ServerState> {
        let mut config = ServerConfig {
            llm: llm::LlmConfig::stub_with_output(
                r#"{"tables": {}, "text": "schedule", "metadata": {"insurer": "DUAL Australia", "wording_version": "11.20"}}"#,
            ),
            ..Default::default()
        };
        config.api_keys.insert("test-key".to_string());
        Arc::new(ServerState::new(config).unwrap())
    }

    fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, api_key: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-api-key", api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_router(test_state());
        let response = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_api_key() {
        let app = build_router(test_state());
        let response = app
            .clone()
            .oneshot(get("/api/v1/customers", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get("/api/v1/customers", Some("wrong-key")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn customers_round_trip() {
        let app = build_router(test_state());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/customers",
                "test-key",
                serde_json::json!({"name": "Acme Brokers"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get("/api/v1/customers", Some("test-key")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_runs_document_extraction() {
        let app = build_router(test_state());

        let response = app
            .oneshot(post_json(
                "/api/v1/policies",
                "test-key",
                serde_json::json!({
                    "customer_id": "acme-brokers",
                    "file_name": "schedule.pdf",
                    "content_text": "Policy schedule body",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_without_content_is_rejected() {
        let app = build_router(test_state());

        let response = app
            .oneshot(post_json(
                "/api/v1/policies",
                "test-key",
                serde_json::json!({"customer_id": "acme-brokers"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = build_router(test_state());
        let response = app.oneshot(get("/api/v1/nope", Some("test-key"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
