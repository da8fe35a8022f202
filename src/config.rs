//! Runtime settings read from the environment (and a `.env` file, if present).

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_URL_VAR: &str = "GITHUB_API_URL";
const TIMEOUT_VAR: &str = "GITHUB_USER_TIMEOUT_SECS";
const LOG_FILE_VAR: &str = "GITHUB_USER_LOG";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout. `None` leaves the transport default (no timeout).
    pub timeout: Option<Duration>,
    /// Where log records go. Logging is disabled when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads `.env` (ignored when missing) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = non_empty(lookup(API_URL_VAR)) {
            let trimmed = value.trim_end_matches('/');
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::InvalidUrl {
                    var: API_URL_VAR,
                    value,
                });
            }
            config.api_url = trimmed.to_string();
        }

        if let Some(value) = non_empty(lookup(TIMEOUT_VAR)) {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: TIMEOUT_VAR,
                        value,
                    });
                }
            }
        }

        config.log_file = non_empty(lookup(LOG_FILE_VAR)).map(PathBuf::from);

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
