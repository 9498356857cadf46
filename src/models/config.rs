//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Download tool configuration.
    pub tool: ToolConfig,
    /// Name of the working subdirectory under the base directory.
    pub work_subdir: String,
    /// Verify staged video copies with SHA-256.
    pub verify_copies: bool,
}

/// Download tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Program name or path.
    pub program: String,
    /// Extra arguments passed before the format selector.
    pub extra_args: Vec<String>,
    /// URL template; `{id}` is replaced with the item id.
    pub url_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            work_subdir: "multilang".to_string(),
            verify_copies: true,
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            extra_args: Vec::new(),
            url_template: "https://www.youtube.com/watch?v={id}".to_string(),
        }
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dub_fetch")
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from file.
pub fn load_config() -> Config {
    let config_path = config_file_path();

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Ignoring invalid config {}: {}", config_path.display(), e),
            },
            Err(e) => tracing::warn!("Cannot read config {}: {}", config_path.display(), e),
        }
    }

    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("work_subdir = \"dubs\"\n[tool]\nextra_args = [\"--no-mtime\"]\n").unwrap();
        assert_eq!(config.work_subdir, "dubs");
        assert!(config.verify_copies);
        assert_eq!(config.tool.extra_args, vec!["--no-mtime".to_string()]);
        assert!(config.tool.url_template.contains("{id}"));
    }

    #[test]
    fn test_default_tool_is_yt_dlp() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tool.program, "yt-dlp");
        assert_eq!(config.work_subdir, "multilang");
    }
}
