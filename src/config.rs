//! Worker configuration read from `[vars]` bindings.

use log::LevelFilter;
use std::str::FromStr;
use std::time::Duration;

pub const PREFIX_VAR: &str = "NAMESPACE_PREFIX";
pub const CALL_TIMEOUT_VAR: &str = "STORAGE_CALL_TIMEOUT_MS";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

const DEFAULT_PREFIX: &str = "tenants";
const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Root under which every namespace lives (`{prefix}/{identifier}/`).
    pub prefix: String,
    /// Bound applied to each individual storage call.
    pub call_timeout: Duration,
    pub log_level: LevelFilter,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must not be empty or start/end with '/': {value:?}")]
    InvalidPrefix { var: &'static str, value: String },
    #[error("{var} must be a positive integer: {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} is not a log level: {value:?}")]
    InvalidLogLevel { var: &'static str, value: String },
}

impl ProvisionConfig {
    /// Build from a variable lookup; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup(PREFIX_VAR) {
            let trimmed = prefix.trim();
            if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.ends_with('/') {
                return Err(ConfigError::InvalidPrefix {
                    var: PREFIX_VAR,
                    value: prefix,
                });
            }
            config.prefix = trimmed.to_string();
        }

        if let Some(raw) = lookup(CALL_TIMEOUT_VAR) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: CALL_TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.call_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(LOG_LEVEL_VAR) {
            config.log_level =
                LevelFilter::from_str(raw.trim()).map_err(|_| ConfigError::InvalidLogLevel {
                    var: LOG_LEVEL_VAR,
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }

    /// Read from worker `[vars]`.
    pub fn from_env(env: &worker::Env) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env.var(name).ok().map(|v| v.to_string()))
    }
}
