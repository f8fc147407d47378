//! Runtime configuration
//!
//! Loaded from `config.toml` in the platform config directory. Every field has
//! a default, so a missing file or a partial file are both fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::auth::PasswordPolicy;
use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";

/// Longest allowed session: one year
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
}

/// Session and password settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Fixed validity window of a session, counted from issuance
    pub session_ttl_hours: i64,
    pub password: PasswordPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24 * 7,
            password: PasswordPolicy::default(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.session_ttl_hours).unwrap_or(chrono::Duration::MAX)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(Error::InvalidConfig(format!(
                "auth.session_ttl_hours must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; `None` means `ledger.db` in the data directory
    pub path: Option<PathBuf>,
    /// Upper bound on how long a statement waits for a locked database
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Config {
    /// Parse from TOML text and reject out-of-range values
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.auth.validate()?;
        Ok(config)
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
    }
}

/// Default data directory (database, token file)
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "onyx", "ledger").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        ))
    })
}
