//! Account configuration and config entries
//!
//! ```yaml
//! email: user@example.com
//! password: secret
//! type: worx
//! fallback_refresh_minutes: 15
//! base_features: [lock, setzone, restart, config, schedule]
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use landroid_core::{LandroidFeatureSupport, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Vendor cloud the account belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudType {
    #[default]
    Worx,
    Kress,
    Landxcape,
}

impl CloudType {
    pub const fn as_str(self) -> &'static str {
        match self {
            CloudType::Worx => "worx",
            CloudType::Kress => "kress",
            CloudType::Landxcape => "landxcape",
        }
    }

    /// Manufacturer name shown in the device registry
    pub const fn manufacturer(self) -> &'static str {
        match self {
            CloudType::Worx => "Worx",
            CloudType::Kress => "Kress",
            CloudType::Landxcape => "Landxcape",
        }
    }
}

impl fmt::Display for CloudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_fallback_refresh_minutes() -> u64 {
    15
}

/// Landroid Cloud account configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LandroidConfig {
    pub email: String,
    pub password: String,
    #[serde(rename = "type", default)]
    pub cloud: CloudType,
    /// Delay before the Web API refresh used while MQTT is disconnected
    #[serde(default = "default_fallback_refresh_minutes")]
    pub fallback_refresh_minutes: u64,
    /// Service names every device gets regardless of what it reports
    #[serde(default)]
    pub base_features: Option<Vec<String>>,
}

impl LandroidConfig {
    /// Load and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading Landroid config: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content, path)
    }

    /// Parse and validate YAML content; `source_path` is used in errors
    pub fn from_yaml_str(content: &str, source_path: &Path) -> ConfigResult<Self> {
        let mut config: Self =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
                path: source_path.to_path_buf(),
                source: e,
            })?;
        config.email = config.email.trim().to_lowercase();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.email.contains('@') {
            return Err(ConfigError::InvalidValue {
                key: "email".to_string(),
                reason: format!("'{}' is not an e-mail address", self.email),
            });
        }
        if self.password.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "password".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.fallback_refresh_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "fallback_refresh_minutes".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.base_features()?;
        Ok(())
    }

    /// Base feature set before vendor detection
    pub fn base_features(&self) -> ConfigResult<LandroidFeatureSupport> {
        let Some(names) = &self.base_features else {
            return Ok(LandroidFeatureSupport::BASE);
        };

        names.iter().try_fold(LandroidFeatureSupport::empty(), |acc, name| {
            Operation::from_service_name(name)
                .map(|op| acc | op.feature())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "base_features".to_string(),
                    reason: format!("unknown service '{}'", name),
                })
        })
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_secs(self.fallback_refresh_minutes * 60)
    }
}

/// A loaded config entry for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub entry_id: String,
    pub unique_id: Option<String>,
    pub title: String,
}

impl EntryInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            entry_id: ulid::Ulid::new().to_string(),
            unique_id: None,
            title: title.into(),
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Entry for an account, keyed by its e-mail address
    pub fn for_account(config: &LandroidConfig) -> Self {
        Self::new(format!("{} ({})", config.email, config.cloud.manufacturer()))
            .with_unique_id(config.email.clone())
    }
}
