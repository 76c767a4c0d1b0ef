//! CLI configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use qaflow_common::stage::clamp_depth;

/// Default backend address (the backend listens on port 10000 unless `PORT` is set)
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:10000";

/// CLI configuration, loaded from `~/.qaflow/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Backend base URL
    pub backend_url: String,

    /// Crawl depth used when a command does not pass `--depth`
    pub default_depth: u32,

    /// Run browser tests without a visible window
    pub headless: bool,

    /// Directory exports and downloaded reports are written to
    pub export_dir: PathBuf,

    /// Directory holding the persisted session
    pub state_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_depth: 1,
            headless: true,
            export_dir: PathBuf::from("."),
            state_dir: qaflow_common::default_store_path(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        let url = self.backend_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(qaflow_common::Error::InvalidConfig(format!(
                "backend_url must be an http(s) URL, got '{}'",
                self.backend_url
            ))
            .into());
        }
        Ok(())
    }

    /// Apply command-line/environment overrides
    pub fn with_overrides(mut self, backend_url: Option<String>, state_dir: Option<PathBuf>) -> Self {
        if let Some(url) = backend_url {
            self.backend_url = url;
        }
        if let Some(dir) = state_dir {
            self.state_dir = dir;
        }
        self
    }

    /// Depth to send, clamped to what the backend crawls
    pub fn depth(&self, requested: Option<u32>) -> u32 {
        clamp_depth(requested.unwrap_or(self.default_depth))
    }

    /// Get the session file path
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = CliConfig::load(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert!(config.headless);
    }

    #[test]
    fn test_save_load_round_trip_and_partial_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/config.toml");

        let config = CliConfig {
            backend_url: "http://qa.internal:8080".into(),
            default_depth: 2,
            ..CliConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(CliConfig::load(&path).unwrap(), config);

        std::fs::write(&path, "headless = false\n").unwrap();
        let partial = CliConfig::load(&path).unwrap();
        assert!(!partial.headless);
        assert_eq!(partial.default_depth, 1);
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "backend_url = \"ftp://example.com\"\n").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }

    #[test]
    fn test_depth_is_clamped() {
        let config = CliConfig::default();
        assert_eq!(config.depth(None), 1);
        assert_eq!(config.depth(Some(5)), 2);
    }
}
