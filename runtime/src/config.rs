//! Environment-driven client configuration.
//!
//! # Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PLATFORM_API_BASE_URL` | `http://localhost:30099/` |
//! | `PLATFORM_API_TOKEN` | unset (no auth) |
//! | `PLATFORM_API_TIMEOUT_MS` | `12000` |
//! | `PLATFORM_CANCEL_DUPLICATE` | `false` |
//! | `PLATFORM_DEFAULT_USER_ID` | unset |
//!
//! # Example
//!
//! ```no_run
//! use platform_client_runtime::config::ClientConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! config.validate()?;
//! let client = config.into_builder().build();
//! # Ok(())
//! # }
//! ```

use crate::client::HttpClientBuilder;
use platform_client_core::StaticToken;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Base URL used when `PLATFORM_API_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:30099/";

/// Timeout used when `PLATFORM_API_TIMEOUT_MS` is unset
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;

const BASE_URL_VAR: &str = "PLATFORM_API_BASE_URL";
const TOKEN_VAR: &str = "PLATFORM_API_TOKEN";
const TIMEOUT_VAR: &str = "PLATFORM_API_TIMEOUT_MS";
const CANCEL_DUPLICATE_VAR: &str = "PLATFORM_CANCEL_DUPLICATE";
const DEFAULT_USER_ID_VAR: &str = "PLATFORM_DEFAULT_USER_ID";

/// Configuration error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Client settings loaded from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL prepended to relative request URLs
    pub base_url: String,
    /// Bearer token, if any
    pub token: Option<String>,
    /// Default per-request timeout; zero disables
    pub timeout: Duration,
    /// Cancel an in-flight call when an identical one is dispatched
    pub cancel_duplicate: bool,
    /// User whose chat sessions are listed by default
    pub default_user_id: Option<String>,
}

impl ClientConfig {
    /// Load from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric or boolean variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric or boolean variable cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let timeout_ms = match get(TIMEOUT_VAR) {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: TIMEOUT_VAR,
                value: raw,
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let cancel_duplicate = match get(CANCEL_DUPLICATE_VAR) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                var: CANCEL_DUPLICATE_VAR,
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: get(TOKEN_VAR),
            timeout: Duration::from_millis(timeout_ms),
            cancel_duplicate,
            default_user_id: get(DEFAULT_USER_ID_VAR),
        })
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an `http(s)://` URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lower = self.base_url.to_ascii_lowercase();
        let rest = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
            _ => Err(ConfigError::Validation(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            ))),
        }
    }

    /// Client builder preloaded with these settings
    #[must_use]
    pub fn into_builder(self) -> HttpClientBuilder {
        HttpClientBuilder::new()
            .base_url(self.base_url)
            .timeout(self.timeout)
            .cancel_duplicate(self.cancel_duplicate)
            .token_provider(Arc::new(StaticToken::new(self.token)))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            cancel_duplicate: false,
            default_user_id: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("cancel_duplicate", &self.cancel_duplicate)
            .field("default_user_id", &self.default_user_id)
            .finish()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, Duration::from_millis(12_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PLATFORM_API_BASE_URL", "https://api.example/"),
            ("PLATFORM_API_TOKEN", "t0k3n"),
            ("PLATFORM_API_TIMEOUT_MS", "0"),
            ("PLATFORM_CANCEL_DUPLICATE", "TRUE"),
            ("PLATFORM_DEFAULT_USER_ID", "u-1"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.example/");
        assert_eq!(config.token.as_deref(), Some("t0k3n"));
        assert_eq!(config.timeout, Duration::ZERO);
        assert!(config.cancel_duplicate);
        assert_eq!(config.default_user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = ClientConfig::from_lookup(lookup(&[("PLATFORM_API_TOKEN", "  ")])).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[("PLATFORM_API_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "PLATFORM_API_TIMEOUT_MS",
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_flag() {
        let err = ClientConfig::from_lookup(lookup(&[("PLATFORM_CANCEL_DUPLICATE", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "PLATFORM_CANCEL_DUPLICATE", .. }));
    }

    #[test]
    fn test_validate_rejects_non_http_base() {
        for base in ["ftp://files.example/", "localhost:30099", "http://", "/api"] {
            let config = ClientConfig {
                base_url: base.to_string(),
                ..ClientConfig::default()
            };
            assert!(config.validate().is_err(), "{base} should be rejected");
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig {
            token: Some("secret".to_string()),
            ..ClientConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
