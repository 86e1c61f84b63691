//! YAML configuration file support for the Covercheck pipeline.
//!
//! Lets deployments define all stage configurations (upload, llm, store) in
//! a single YAML file and load them at runtime.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # Covercheck pipeline configuration
//! version: "1.0"
//! name: "production"
//!
//! upload:
//!   version: 1
//!   default_customer_id: "unassigned"
//!   strip_control_chars: true
//!   max_payload_bytes: 26214400
//!
//! llm:
//!   mode: "api"
//!   model: "gpt-5-mini"
//!   comparison_model: "gpt-5"
//!   api_url: "https://llm.internal.example.com/v1/responses"
//!   enable_resilience: true
//!
//! store:
//!   backend: "redb"
//!   path: "/data/covercheck.redb"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ingest::UploadConfig;
use llm::LlmConfig;
use store::BackendConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CovercheckConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Upload stage configuration
    #[serde(default)]
    pub upload: UploadConfig,

    /// Completion client configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreSection,
}

/// Store section of the YAML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Backend selector: "in_memory" or "redb"
    pub backend: String,

    /// Database path, required for the redb backend
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            path: None,
        }
    }
}

impl StoreSection {
    /// Resolve to a [`BackendConfig`].
    pub fn to_backend_config(&self) -> Result<BackendConfig, ConfigLoadError> {
        match self.backend.as_str() {
            "in_memory" => Ok(BackendConfig::in_memory()),
            "redb" => {
                let path = self.path.as_deref().ok_or_else(|| {
                    ConfigLoadError::Validation("store.path is required for the redb backend".into())
                })?;
                Ok(BackendConfig::redb(path))
            }
            other => Err(ConfigLoadError::Validation(format!(
                "unknown store backend '{other}' (expected \"in_memory\" or \"redb\")"
            ))),
        }
    }
}

impl Default for CovercheckConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            upload: UploadConfig::default(),
            llm: LlmConfig::default(),
            store: StoreSection::default(),
        }
    }
}

impl CovercheckConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a YAML configuration from a string.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigLoadError> {
        let config: CovercheckConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version != "1.0" {
            return Err(ConfigLoadError::UnsupportedVersion(self.version.clone()));
        }
        self.upload
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;
        self.store.to_backend_config()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CovercheckConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_full_yaml() {
        let yaml = r#"
version: "1.0"
name: "production"
upload:
  version: 1
  default_customer_id: "unassigned"
  doc_id_namespace: "6ba7b812-9dad-11d1-80b4-00c04fd430c8"
  strip_control_chars: true
  max_payload_bytes: 26214400
  max_normalized_bytes: null
llm:
  mode: "stub"
  model: "gpt-5-mini"
  comparison_model: "gpt-5"
  api_url: null
  api_auth_header: null
  api_provider: null
  api_timeout_secs: 30
  max_output_tokens: 2000
  enable_resilience: false
store:
  backend: "redb"
  path: "/tmp/covercheck.redb"
"#;
        let config = CovercheckConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("production"));
        assert_eq!(config.llm.mode, "stub");
        assert!(matches!(
            config.store.to_backend_config().unwrap(),
            BackendConfig::Redb { .. }
        ));
    }

    #[test]
    fn unsupported_version_rejected() {
        let yaml = r#"
version: "9.9"
"#;
        let err = CovercheckConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(_)));
    }

    #[test]
    fn redb_backend_requires_path() {
        let section = StoreSection {
            backend: "redb".to_string(),
            path: None,
        };
        assert!(matches!(
            section.to_backend_config(),
            Err(ConfigLoadError::Validation(_))
        ));
    }

    #[test]
    fn unknown_backend_rejected() {
        let section = StoreSection {
            backend: "postgres".to_string(),
            path: None,
        };
        assert!(matches!(
            section.to_backend_config(),
            Err(ConfigLoadError::Validation(_))
        ));
    }
}
