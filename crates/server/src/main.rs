//! Covercheck Server - HTTP REST API for the policy review pipeline
//!
//! This binary provides the HTTP server exposing upload, extraction,
//! matching, comparison, and chat endpoints with authentication and rate
//! limiting.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env in development
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
