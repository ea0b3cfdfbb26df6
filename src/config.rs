//! 客户端配置：超时、状态码白名单、错误键以及传输层能力。
//!
//! Client configuration.
//!
//! All values are static for the lifetime of a client. Sources, in order of
//! precedence for [`ClientConfig::from_env`]: environment variables, then the
//! built-in defaults. YAML files are loaded with [`ClientConfig::from_yaml_file`].
//!
//! | Variable                        | Field                      |
//! |---------------------------------|----------------------------|
//! | `FETCH_API_TIMEOUT_MS`          | `timeout_ms`               |
//! | `FETCH_API_ACCEPTABLE_STATUSES` | `acceptable_statuses`      |
//! | `FETCH_API_ABORTABLE`           | `transport.abortable`      |
//! | `FETCH_API_PROXY_URL`           | `transport.proxy_url`      |

use crate::error::ErrorContext;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Generic key used when transport or status text is not shown verbatim.
pub const NETWORK_ERROR_KEY: &str = "errors.network";
/// Key carried by responses produced when the timer wins the race.
pub const TIMEOUT_ERROR_KEY: &str = "errors.timeout";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Statuses whose bodies are expected to carry a protocol envelope.
pub const DEFAULT_ACCEPTABLE_STATUSES: [u16; 9] = [200, 201, 202, 400, 401, 403, 409, 422, 500];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whether in-flight calls can be aborted from the client side.
    pub abortable: bool,
    pub proxy_url: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            abortable: true,
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub timeout_ms: u64,
    pub acceptable_statuses: Vec<u16>,
    pub network_error_key: String,
    pub timeout_error_key: String,
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            acceptable_statuses: DEFAULT_ACCEPTABLE_STATUSES.to_vec(),
            network_error_key: NETWORK_ERROR_KEY.to_string(),
            timeout_error_key: TIMEOUT_ERROR_KEY.to_string(),
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `FETCH_API_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<u64>("FETCH_API_TIMEOUT_MS") {
            config.timeout_ms = ms;
        }
        if let Ok(raw) = env::var("FETCH_API_ACCEPTABLE_STATUSES") {
            match parse_status_list(&raw) {
                Some(list) => config.acceptable_statuses = list,
                None => tracing::warn!(value = raw.as_str(), "ignoring FETCH_API_ACCEPTABLE_STATUSES"),
            }
        }
        if let Ok(raw) = env::var("FETCH_API_ABORTABLE") {
            config.transport.abortable = !matches!(raw.trim(), "0" | "false" | "no");
        }
        if let Ok(url) = env::var("FETCH_API_PROXY_URL") {
            if !url.trim().is_empty() {
                config.transport.proxy_url = Some(url);
            }
        }

        config
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_acceptable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.acceptable_statuses = statuses.into_iter().collect();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("timeout_ms")
                    .with_source("client_config"),
            ));
        }
        if self.acceptable_statuses.is_empty() {
            return Err(Error::configuration_with_context(
                "acceptable status whitelist is empty",
                ErrorContext::new()
                    .with_field_path("acceptable_statuses")
                    .with_source("client_config"),
            ));
        }
        if let Some(bad) = self
            .acceptable_statuses
            .iter()
            .find(|s| !(100..=599).contains(*s))
        {
            return Err(Error::configuration_with_context(
                format!("{} is not an HTTP status code", bad),
                ErrorContext::new()
                    .with_field_path("acceptable_statuses")
                    .with_source("client_config"),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(variable = name, value = raw.as_str(), "ignoring unparseable value");
            None
        }
    }
}

fn parse_status_list(raw: &str) -> Option<Vec<u16>> {
    let list = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u16>().ok())
        .collect::<Option<Vec<_>>>()?;
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.acceptable_statuses.contains(&200));
        assert!(!config.acceptable_statuses.contains(&404));
        assert!(config.transport.abortable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = ClientConfig::from_yaml_str(
            r#"
timeout_ms: 1500
acceptable_statuses: [200, 404]
transport:
  abortable: false
"#,
        )
        .unwrap();
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.acceptable_statuses, vec![200, 404]);
        assert!(!config.transport.abortable);
        assert_eq!(config.network_error_key, NETWORK_ERROR_KEY);
    }

    #[test]
    fn test_yaml_rejects_invalid_values() {
        assert!(matches!(
            ClientConfig::from_yaml_str("timeout_ms: 0").unwrap_err(),
            Error::Configuration { .. }
        ));
        assert!(ClientConfig::from_yaml_str("acceptable_statuses: []").is_err());
        assert!(ClientConfig::from_yaml_str("acceptable_statuses: [42]").is_err());
        assert!(matches!(
            ClientConfig::from_yaml_str("timeout_ms: [").unwrap_err(),
            Error::Yaml(_)
        ));
    }

    #[test]
    fn test_status_list_parsing() {
        assert_eq!(parse_status_list("200, 201,404"), Some(vec![200, 201, 404]));
        assert_eq!(parse_status_list("200,abc"), None);
        assert_eq!(parse_status_list(" , "), None);
    }

    #[test]
    fn test_builder_helpers() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_millis(250))
            .with_acceptable_statuses([200]);
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.acceptable_statuses, vec![200]);
    }
}
