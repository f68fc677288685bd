use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::DEFAULT_BASE_URL;
use crate::error::ComparerError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Service endpoint, overridden per run by `--server`
    pub base_url: String,

    /// Request timeout in seconds; unset keeps the HTTP client default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colour status lines and headers
    pub use_color: bool,

    /// Border characters for tables
    pub table_style: TableStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    Ascii,
    Utf8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            table_style: TableStyle::Ascii,
        }
    }
}

impl Config {
    /// Load config from `path`, or the default location when `None`.
    ///
    /// A missing file yields defaults. A file that exists but does not
    /// parse is an error rather than silently ignored.
    pub fn load(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::get_config_path() {
                Ok(p) => p,
                Err(_) => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            tracing::debug!(target: "config", "No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).map_err(|e| ComparerError::Config {
            path: config_path.clone(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&contents).map_err(|e| ComparerError::Config {
            path: config_path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(target: "config", "Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Base URL for this run, with any trailing slash removed.
    pub fn effective_base_url(&self, server_override: Option<&str>) -> String {
        server_override
            .unwrap_or(&self.api.base_url)
            .trim_end_matches('/')
            .to_string()
    }

    /// Write the commented default config to `path`.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "Config file already exists at {} (use --force to overwrite)",
                path.display()
            );
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Error creating config directory {}", parent.display()))?;
        }

        fs::write(path, Self::create_default_with_comments())
            .with_context(|| format!("Error writing config file {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("comparer-cli").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# Comparer CLI Configuration File
# Location: ~/.config/comparer-cli/config.toml (Linux)
#           ~/Library/Application Support/comparer-cli/config.toml (macOS)
#           %APPDATA%\comparer-cli\config.toml (Windows)
#
# The API key is never read from this file. Export COMPARER_API_KEY instead.

[api]
# Service endpoint (the --server flag overrides this per run)
base_url = "{DEFAULT_BASE_URL}"

# Request timeout in seconds (leave commented to use the HTTP client default)
# timeout_secs = 30

[display]
# Colour status lines and table headers
use_color = true

# Table borders: "ascii" or "utf8"
table_style = "ascii"
"#
        )
    }
}
