//! Gateway configuration from the environment

use crate::i18n::{I18nError, Language, MissingKeyPolicy};
use std::time::Duration;
use thiserror::Error;

/// Upstream AI backend used when `EDUMIND_UPSTREAM_URL` is not set
pub const DEFAULT_UPSTREAM_URL: &str = "http://132.196.175.116";

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error(transparent)]
    I18n(#[from] I18nError),
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub upstream_url: String,
    /// `None` leaves calls bounded only by the transport
    pub upstream_timeout: Option<Duration>,
    pub language: Language,
    pub missing_key_policy: MissingKeyPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: Some(DEFAULT_UPSTREAM_TIMEOUT),
            language: Language::default(),
            missing_key_policy: MissingKeyPolicy::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("EDUMIND_PORT") {
            config.port = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "EDUMIND_PORT",
                value,
            })?;
        }

        if let Some(value) = lookup("EDUMIND_UPSTREAM_URL") {
            let trimmed = value.trim().trim_end_matches('/');
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    var: "EDUMIND_UPSTREAM_URL",
                    value,
                });
            }
            config.upstream_url = trimmed.to_string();
        }

        if let Some(value) = lookup("EDUMIND_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "EDUMIND_UPSTREAM_TIMEOUT_SECS",
                value,
            })?;
            config.upstream_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(value) = lookup("EDUMIND_LANGUAGE") {
            config.language = value.parse()?;
        }

        if let Some(value) = lookup("EDUMIND_I18N_STRICT") {
            config.missing_key_policy = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => MissingKeyPolicy::Strict,
                "0" | "false" | "no" => MissingKeyPolicy::Fallback,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "EDUMIND_I18N_STRICT",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}
