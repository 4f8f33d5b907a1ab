//! Upstream affiliate API endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default gateway of the AliExpress open platform.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api-sg.aliexpress.com/sync";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total time allowed for one upstream call, including reading the body.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate that the endpoint is an absolute http(s) URL and timeouts are bounded.
    pub fn validate(&self) -> Result<(), String> {
        let url_parts: Vec<&str> = self.base_url.splitn(2, "://").collect();
        if url_parts.len() != 2 || url_parts[1].is_empty() {
            return Err(format!(
                "Invalid upstream URL format (missing scheme): {}",
                self.base_url
            ));
        }
        match url_parts[0] {
            "http" | "https" => {}
            other => {
                return Err(format!(
                    "Unsupported upstream protocol '{other}'. Currently supported: http, https"
                ))
            }
        }
        if self.timeout_secs == 0 {
            return Err("upstream.timeout_secs must be greater than zero".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("upstream.connect_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_upstream_is_valid() {
        let config = UpstreamConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_missing_scheme() {
        let config = UpstreamConfig {
            base_url: "api-sg.aliexpress.com/sync".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let config = UpstreamConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("ftp"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = UpstreamConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
