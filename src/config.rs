//! Relay configuration.
//!
//! Loaded once at startup from a JSON file (path via `TASK_RELAY_CONFIG`).
//! The routing table and the task-marker literal are static for the lifetime
//! of a run; keyword sources are re-read on explicit reload only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Env var holding the config file path.
pub const CONFIG_ENV_VAR: &str = "TASK_RELAY_CONFIG";

/// Default config file path when the env var is unset.
pub const DEFAULT_CONFIG_PATH: &str = "relay.json";

/// Default task-marker prefix on bot-forwarded task messages.
pub const DEFAULT_TASK_MARKER: &str = "New task received:";

/// A routed category: where its keywords live and where matches go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Line-delimited keyword source file (one token per line).
    pub keywords: PathBuf,
    /// Destination channel id for forwarded matches.
    pub destination: String,
}

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Category name → keyword source + destination.
    pub categories: BTreeMap<String, CategoryConfig>,
    /// Line-delimited confirmation phrase source (one phrase per line).
    pub confirmation_phrases: PathBuf,
    /// Channel that receives every completion notice.
    pub audit_channel: String,
    /// Literal prefix marking bot-forwarded task messages.
    #[serde(default = "default_task_marker")]
    pub task_marker: String,
    /// Channels whose messages are classified. Empty means all channels.
    /// Confirmation replies are accepted from any channel regardless.
    #[serde(default)]
    pub watch_channels: Vec<String>,
    /// Also send completion notices back to the task's origin channel.
    #[serde(default = "default_true")]
    pub notify_origin: bool,
}

fn default_task_marker() -> String {
    DEFAULT_TASK_MARKER.to_string()
}

fn default_true() -> bool {
    true
}

impl RelayConfig {
    /// Load the config from the path in `TASK_RELAY_CONFIG` (or the default).
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_file(&path)
    }

    /// Load and validate the config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants the pipeline relies on.
    ///
    /// Every matched category must resolve to a destination at runtime, so
    /// empty names, empty destinations, and a missing audit channel are
    /// rejected here rather than surfacing mid-route.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "categories".into(),
                message: "at least one category is required".into(),
            });
        }
        for (name, category) in &self.categories {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "categories".into(),
                    message: "category names must be non-empty".into(),
                });
            }
            if category.destination.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("categories.{name}.destination"),
                    message: "destination channel id must be non-empty".into(),
                });
            }
        }
        if self.audit_channel.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "audit_channel".into(),
                message: "audit channel id must be non-empty".into(),
            });
        }
        if self.task_marker.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "task_marker".into(),
                message: "task marker must be non-empty".into(),
            });
        }
        Ok(())
    }

    /// Category → keyword source file, for the keyword store.
    pub fn keyword_sources(&self) -> BTreeMap<String, PathBuf> {
        self.categories
            .iter()
            .map(|(name, c)| (name.clone(), c.keywords.clone()))
            .collect()
    }

    /// Category → destination channel id, for the router.
    pub fn routes(&self) -> BTreeMap<String, String> {
        self.categories
            .iter()
            .map(|(name, c)| (name.clone(), c.destination.clone()))
            .collect()
    }
}
