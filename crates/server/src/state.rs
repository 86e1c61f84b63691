use crate::config::ServerConfig;
use crate::error::ServerResult;
use dashmap::DashMap;
use ingest::UploadConfig;
use llm::LlmConfig;
use std::sync::Arc;
use store::{BackendConfig, PolicyStore};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Record store (shared across requests)
    pub store: Arc<PolicyStore>,

    /// Upload validation configuration
    pub upload_cfg: Arc<UploadConfig>,

    /// Completion client configuration
    pub llm_cfg: Arc<LlmConfig>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let backend = match &config.store_path {
            Some(path) => BackendConfig::redb(path.clone()),
            None => BackendConfig::in_memory(),
        };
        let store = Arc::new(PolicyStore::open(&backend)?);

        let llm_cfg = Arc::new(config.llm.clone());

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            store,
            upload_cfg: Arc::new(UploadConfig::default()),
            llm_cfg,
        })
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        // Check limit
        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_enforced_per_key() {
        let config = ServerConfig {
            rate_limit_per_minute: 2,
            ..Default::default()
        };
        let state = ServerState::new(config).unwrap();

        assert!(state.check_rate_limit("key-a"));
        assert!(state.check_rate_limit("key-a"));
        assert!(!state.check_rate_limit("key-a"));
        // A different key has its own window.
        assert!(state.check_rate_limit("key-b"));
    }
}
