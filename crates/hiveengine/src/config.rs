//! Api configuration: defaults, YAML files and environment overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hiveengine_http::DEFAULT_HISTORY_URL;

use crate::error::{EngineError, Result};
use crate::ops::SSC_MAINNET_ID;

/// Comma separated node URLs.
pub const ENV_NODES: &str = "HIVEENGINE_NODES";
pub const ENV_HISTORY_URL: &str = "HIVEENGINE_HISTORY_URL";

/// Largest page a node returns from `find`.
pub const MAX_FIND_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Node base URLs in preference order. Empty means the built-in defaults.
    pub nodes: Vec<String>,
    pub history_url: String,
    /// Ask Beacon for ranked nodes before falling back to `nodes`.
    pub discover: bool,
    /// Keep at most this many discovered nodes.
    pub discover_limit: Option<usize>,
    /// Spread calls round-robin instead of preferring the first node.
    pub rotate: bool,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Page size used by `find_all`.
    pub page_size: u32,
    pub ssc_id: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            history_url: DEFAULT_HISTORY_URL.to_string(),
            discover: false,
            discover_limit: None,
            rotate: false,
            request_timeout_secs: 15,
            max_retries: 1,
            page_size: MAX_FIND_LIMIT,
            ssc_id: SSC_MAINNET_ID.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    /// Defaults overridden by `HIVEENGINE_NODES` / `HIVEENGINE_HISTORY_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_NODES).ok().as_deref(),
            std::env::var(ENV_HISTORY_URL).ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, nodes: Option<&str>, history_url: Option<&str>) {
        if let Some(nodes) = nodes {
            let parsed: Vec<String> = nodes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !parsed.is_empty() {
                self.nodes = parsed;
            }
        }
        if let Some(url) = history_url.map(str::trim).filter(|s| !s.is_empty()) {
            self.history_url = url.to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_FIND_LIMIT {
            return Err(EngineError::Config(format!(
                "page_size must be between 1 and {MAX_FIND_LIMIT}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(EngineError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.history_url.trim().is_empty() {
            return Err(EngineError::Config("history_url cannot be empty".into()));
        }
        if self.ssc_id.trim().is_empty() {
            return Err(EngineError::Config("ssc_id cannot be empty".into()));
        }
        Ok(())
    }
}
