/// Configuration for the task board client.
/// Reads client.json from ~/.config/taskboard/client.json (or platform equivalent).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Commit and refetch timeout. 0 disables it.
    #[serde(default = "default_commit_timeout_ms")]
    pub commit_timeout_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_commit_timeout_ms() -> u64 {
    10_000
}

fn default_page_size() -> u32 {
    50
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            project_id: None,
            token: None,
            commit_timeout_ms: default_commit_timeout_ms(),
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    pub fn commit_timeout(&self) -> Option<Duration> {
        (self.commit_timeout_ms > 0).then(|| Duration::from_millis(self.commit_timeout_ms))
    }

    /// Apply command-line / environment overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        project_id: Option<String>,
        token: Option<String>,
    ) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if project_id.is_some() {
            self.project_id = project_id;
        }
        if token.is_some() {
            self.token = token;
        }
        self
    }
}

/// Default config path: ~/.config/taskboard/client.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join("client.json")
}

/// Load config from path. Returns default if file doesn't exist.
pub fn load_config(path: &Path) -> ClientConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config {}: {}", path.display(), e);
            ClientConfig::default()
        }),
        Err(_) => {
            log::info!("No config at {}, using defaults", path.display());
            ClientConfig::default()
        }
    }
}
