//! Client configuration.
//!
//! Values come from, in increasing priority: built-in defaults, environment
//! variables, and whatever the front end sets explicitly (CLI flags).
//!
//! | Setting | Env var | Default |
//! |---|---|---|
//! | backend origin | `VIVA_API_URL` | `http://localhost:8000` |
//! | storage directory | `VIVA_DATA_DIR` | `~/.viva` |
//! | request timeout | `VIVA_TIMEOUT_SECS` | 30 |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::paths::default_data_dir;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "VIVA_API_URL";
pub const ENV_DATA_DIR: &str = "VIVA_DATA_DIR";
pub const ENV_TIMEOUT_SECS: &str = "VIVA_TIMEOUT_SECS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    /// Directory holding `storage.json`.
    pub data_dir: PathBuf,
    /// Overall timeout applied to each request by the transport.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `VIVA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = non_empty_var(ENV_API_URL) {
            config = config.with_base_url(url)?;
        }
        if let Some(dir) = non_empty_var(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = non_empty_var(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidTimeout {
                name: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replace the backend origin, validating the scheme and trimming any
    /// trailing slash.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
