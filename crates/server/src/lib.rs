//! Covercheck Server - HTTP REST API for the policy review pipeline
//!
//! This crate provides the HTTP server that exposes the Covercheck pipeline
//! via a REST API:
//!
//! - **Customers & Wordings**: Directory of customers and operator-entered
//!   reference wording records
//! - **Policy Upload**: Validate + run document extraction on upload
//! - **Review Pipeline**: Field extraction, insurer/version matching, and
//!   schedule-vs-wording comparison per policy
//! - **Chat**: Policy-scoped question answering with clarification flow
//! - **Health & Metrics**: Liveness/readiness probes and Prometheus metrics
//!
//! # Features
//!
//! - **Authentication**: API key-based authentication with rate limiting
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: Structured error responses with error codes
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected Endpoints (API Key Required)
//!
//! - `POST /api/v1/customers` / `GET /api/v1/customers`
//! - `POST /api/v1/wordings` / `GET /api/v1/wordings` / `GET /api/v1/wordings/{id}`
//! - `POST /api/v1/policies` - Upload + document extraction
//! - `GET /api/v1/policies` / `GET /api/v1/policies/{id}`
//! - `POST /api/v1/policies/{id}/extract` - Field extraction
//! - `POST /api/v1/policies/{id}/match` - Insurer/version matching
//! - `POST /api/v1/policies/{id}/compare` - Schedule/wording comparison
//! - `GET /api/v1/policies/{id}/analysis` - Stored comparison reports
//! - `POST /api/v1/chat` - Policy-scoped Q&A
//! - `GET /api/v1/pipeline/status` - Pipeline status
//! - `GET /api/v1/metadata` - Server metadata

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::start_server;
pub use state::ServerState;
