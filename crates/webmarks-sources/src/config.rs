//! Connection configuration: resolution and persistence
//!
//! Resolution order is explicit: process environment first, then the
//! stored config file, otherwise unconfigured. The stored file is a single
//! JSON document read and written wholesale; partial edits are
//! read-modify-write in the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variables consulted by `resolve_config`.
pub const ENV_PROVIDER: &str = "WEBMARKS_PROVIDER";
pub const ENV_API_KEY: &str = "WEBMARKS_API_KEY";
pub const ENV_LOCATOR: &str = "WEBMARKS_LOCATOR";
pub const ENV_VIEW: &str = "WEBMARKS_VIEW";

/// Which backend a config points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[default]
    GoogleSheets,
    Airtable,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GoogleSheets => "google-sheets",
            Provider::Airtable => "airtable",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a provider from its kebab-case id (plus the obvious shorthands).
pub fn parse_provider(s: &str) -> Option<Provider> {
    match s.trim().to_lowercase().as_str() {
        "google-sheets" | "sheets" => Some(Provider::GoogleSheets),
        "airtable" => Some(Provider::Airtable),
        _ => None,
    }
}

/// Where the bookmarks come from and how to reach them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
    /// Sheets: the spreadsheet id. Airtable: `<base>/<table>`.
    #[serde(default)]
    pub locator: String,
    /// Sheets: an A1 range, blank for `Sheet1!A:E`. Airtable: a view
    /// name, blank for `Grid view`.
    #[serde(default)]
    pub view: String,
}

impl ConnectionConfig {
    /// True when the fields a fetch needs are present. An incomplete
    /// config is the idle state, not an error.
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.locator.trim().is_empty()
    }

    /// Read the config from `WEBMARKS_*` environment variables.
    ///
    /// Returns `Some` only when both key and locator are set, so a partial
    /// environment never shadows the stored file.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        let locator = std::env::var(ENV_LOCATOR).unwrap_or_default();
        if api_key.trim().is_empty() || locator.trim().is_empty() {
            return None;
        }

        let provider = std::env::var(ENV_PROVIDER)
            .ok()
            .and_then(|s| parse_provider(&s))
            .unwrap_or_default();

        Some(Self {
            provider,
            api_key,
            locator,
            view: std::env::var(ENV_VIEW).unwrap_or_default(),
        })
    }

    /// Load the stored config from `path`.
    ///
    /// Corrupt or unreadable files are treated exactly like absent ones:
    /// warn and return `None`. Resolution falls through; nothing raises.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring corrupt config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the whole config to `path`, replacing whatever was stored.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Remove the stored config. A missing file is already clear.
pub fn clear_config(path: &Path) -> Result<(), ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::Io(e.to_string())),
    }
}

/// The well-known location: `<platform config dir>/webmarks/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("webmarks").join("config.json"))
}

/// Where an active config came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Environment,
    Stored,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Environment => "environment",
            ConfigSource::Stored => "stored file",
        }
    }
}

/// Outcome of config resolution, tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedConfig {
    Loaded {
        config: ConnectionConfig,
        source: ConfigSource,
    },
    Unconfigured,
}

impl ResolvedConfig {
    pub fn config(&self) -> Option<&ConnectionConfig> {
        match self {
            ResolvedConfig::Loaded { config, .. } => Some(config),
            ResolvedConfig::Unconfigured => None,
        }
    }
}

/// Resolve the active config: environment, then `path`, else unconfigured.
pub fn resolve_config(path: &Path) -> ResolvedConfig {
    if let Some(config) = ConnectionConfig::from_env() {
        return ResolvedConfig::Loaded {
            config,
            source: ConfigSource::Environment,
        };
    }

    if let Some(config) = ConnectionConfig::load(path) {
        return ResolvedConfig::Loaded {
            config,
            source: ConfigSource::Stored,
        };
    }

    ResolvedConfig::Unconfigured
}

/// Errors from explicit save/clear operations. Loading never errors; see
/// `ConnectionConfig::load`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}
