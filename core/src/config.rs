//! Settings for the HTTP-backed transport.
//!
//! Values come from serde (any format the caller parses) or from the
//! process environment. Unset fields keep the defaults: no timeouts, ten
//! redirects, no cap on response body size.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_TIMEOUT_MS: &str = "DATAPROVIDER_TIMEOUT_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "DATAPROVIDER_CONNECT_TIMEOUT_MS";
pub const ENV_MAX_REDIRECTS: &str = "DATAPROVIDER_MAX_REDIRECTS";
pub const ENV_MAX_BODY_BYTES: &str = "DATAPROVIDER_MAX_BODY_BYTES";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Upper bound for a whole call, connect to last body byte.
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    /// Redirects the platform client follows. When they run out the last
    /// 3xx response is returned as-is.
    pub max_redirects: u32,
    /// Largest response body read into memory. A longer body fails the
    /// exchange.
    pub max_body_bytes: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            connect_timeout_ms: None,
            max_redirects: 10,
            max_body_bytes: None,
        }
    }
}

impl TransportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            timeout_ms: parse(&lookup, ENV_TIMEOUT_MS)?.or(defaults.timeout_ms),
            connect_timeout_ms: parse(&lookup, ENV_CONNECT_TIMEOUT_MS)?
                .or(defaults.connect_timeout_ms),
            max_redirects: parse(&lookup, ENV_MAX_REDIRECTS)?.unwrap_or(defaults.max_redirects),
            max_body_bytes: parse(&lookup, ENV_MAX_BODY_BYTES)?.or(defaults.max_body_bytes),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn body_limit(&self) -> u64 {
        self.max_body_bytes.unwrap_or(u64::MAX)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = TransportConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TransportConfig::default());
        assert_eq!(config.timeout(), None);
        assert_eq!(config.body_limit(), u64::MAX);
    }

    #[test]
    fn reads_all_keys() {
        let config = TransportConfig::from_lookup(lookup(&[
            (ENV_TIMEOUT_MS, "1500"),
            (ENV_CONNECT_TIMEOUT_MS, " 200 "),
            (ENV_MAX_REDIRECTS, "0"),
            (ENV_MAX_BODY_BYTES, "1048576"),
        ]))
        .unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_millis(200)));
        assert_eq!(config.max_redirects, 0);
        assert_eq!(config.body_limit(), 1_048_576);
    }

    #[test]
    fn rejects_garbage() {
        let err = TransportConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: ENV_TIMEOUT_MS,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn deserializes_partial_json() {
        let config: TransportConfig = serde_json::from_str(r#"{"timeout_ms":50}"#).unwrap();
        assert_eq!(config.timeout_ms, Some(50));
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.max_body_bytes, None);
    }
}
