//! Configuration management for the feed CLI.
//!
//! Settings are read from an optional `feed.toml` in the data directory.
//! Every field has a default, so a missing file or a partial one is fine.

use anyhow::{Context, Result};
use feed_client::FeedConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// File name of the CLI configuration inside the data directory.
pub const CONFIG_FILE: &str = "feed.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Server settings.
    pub server: ServerConfig,
    /// Feed view settings.
    pub feed: FeedSettings,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// API root (default: http://localhost:8080/api).
    pub base_url: String,
    /// Collection path segment (default: boards).
    pub collection: String,
    /// Request timeout in seconds (default: 30).
    pub request_timeout_secs: u64,
    /// Stream reconnection delay in seconds (default: 3).
    pub stream_retry_secs: u64,
}

/// Feed view settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Records per page (default: 5).
    pub page_size: u32,
    /// Scroll distance that triggers the next page (default: 1000).
    pub scroll_threshold: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let defaults = FeedConfig::default();
        Self {
            base_url: defaults.base_url,
            collection: defaults.collection,
            request_timeout_secs: defaults.request_timeout.as_secs(),
            stream_retry_secs: defaults.stream_retry.as_secs(),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        let defaults = FeedConfig::default();
        Self {
            page_size: defaults.page_size,
            scroll_threshold: defaults.scroll_threshold,
        }
    }
}

impl CliConfig {
    /// Load `feed.toml` from the data directory, or defaults if absent.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        toml::from_str(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Build the client configuration, with an optional server override.
    pub fn feed_config(&self, server: Option<&str>) -> FeedConfig {
        FeedConfig::new(server.unwrap_or(&self.server.base_url))
            .with_collection(&self.server.collection)
            .with_page_size(self.feed.page_size)
            .with_scroll_threshold(self.feed.scroll_threshold)
            .with_request_timeout(Duration::from_secs(self.server.request_timeout_secs))
            .with_stream_retry(Duration::from_secs(self.server.stream_retry_secs))
    }
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = CliConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.feed_config(None), FeedConfig::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        tokio::fs::write(
            dir.path().join(CONFIG_FILE),
            "[server]\nbase_url = \"https://feed.example/api\"\n\n[feed]\npage_size = 10\n",
        )
        .await
        .unwrap();

        let config = CliConfig::load(dir.path()).await.unwrap().feed_config(None);
        assert_eq!(config.base_url, "https://feed.example/api");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.collection, "boards");
        assert_eq!(config.scroll_threshold, 1000);
    }

    #[tokio::test]
    async fn flag_overrides_file() {
        let dir = tempdir().unwrap();
        tokio::fs::write(
            dir.path().join(CONFIG_FILE),
            "[server]\nbase_url = \"https://feed.example/api\"\n",
        )
        .await
        .unwrap();

        let config = CliConfig::load(dir.path())
            .await
            .unwrap()
            .feed_config(Some("http://127.0.0.1:9000/api"));
        assert_eq!(config.base_url, "http://127.0.0.1:9000/api");
    }

    #[tokio::test]
    async fn invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join(CONFIG_FILE), "[feed]\npage_size = \"many\"\n")
            .await
            .unwrap();

        assert!(CliConfig::load(dir.path()).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn data_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        set_dir_permissions_0700(dir.path()).await.unwrap();
        let mode = std::fs::metadata(dir.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
