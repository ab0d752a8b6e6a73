//! Client configuration loading.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::{CredentialProvider, EnvToken, StaticToken};

/// Client configuration, loaded from a YAML file (default `appmgr.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Session token; takes precedence over `token_env`
    #[serde(default)]
    pub token: Option<String>,

    /// Environment variable holding the session token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_token_env() -> String {
    "APPMGR_TOKEN".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
            token_env: default_token_env(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load if the file exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Credential source: configured token, else the environment variable.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        match self.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => Arc::new(StaticToken(token.to_string())),
            None => Arc::new(EnvToken(self.token_env.clone())),
        }
    }
}
