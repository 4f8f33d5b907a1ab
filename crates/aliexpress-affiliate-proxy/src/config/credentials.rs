//! Affiliate API credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ENV_APP_KEY: &str = "ALIEXPRESS_APP_KEY";
pub const ENV_APP_SECRET: &str = "ALIEXPRESS_APP_SECRET";
pub const ENV_TRACKING_ID: &str = "ALIEXPRESS_TRACKING_ID";

/// Errors raised while assembling configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing affiliate credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Credentials as they appear in a config file; any field may be absent and
/// filled in from the environment.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("app_key", &self.app_key)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .field("tracking_id", &self.tracking_id)
            .finish()
    }
}

impl CredentialsConfig {
    /// Resolve into complete credentials, naming every missing field.
    pub fn resolve(&self) -> Result<Credentials, ConfigurationError> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        let app_key = present(&self.app_key);
        let app_secret = present(&self.app_secret);
        let tracking_id = present(&self.tracking_id);

        match (app_key, app_secret, tracking_id) {
            (Some(app_key), Some(app_secret), Some(tracking_id)) => Ok(Credentials {
                app_key: app_key.to_string(),
                app_secret: app_secret.to_string(),
                tracking_id: tracking_id.to_string(),
            }),
            _ => {
                let mut missing = Vec::new();
                if app_key.is_none() {
                    missing.push(ENV_APP_KEY);
                }
                if app_secret.is_none() {
                    missing.push(ENV_APP_SECRET);
                }
                if tracking_id.is_none() {
                    missing.push(ENV_TRACKING_ID);
                }
                Err(ConfigurationError::MissingCredentials(missing))
            }
        }
    }
}

/// Complete, immutable credentials for the affiliate API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: String,
    pub tracking_id: String,
}

impl Credentials {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        tracking_id: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            tracking_id: tracking_id.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("tracking_id", &self.tracking_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_complete_credentials() {
        let config = CredentialsConfig {
            app_key: Some("123".to_string()),
            app_secret: Some(" secret ".to_string()),
            tracking_id: Some("default".to_string()),
        };
        let creds = config.resolve().unwrap();
        assert_eq!(creds, Credentials::new("123", "secret", "default"));
    }

    #[test]
    fn test_resolve_names_missing_fields() {
        let config = CredentialsConfig {
            app_key: Some("123".to_string()),
            app_secret: Some("".to_string()),
            tracking_id: None,
        };
        let err = config.resolve().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingCredentials(vec![ENV_APP_SECRET, ENV_TRACKING_ID])
        );
        assert_eq!(
            err.to_string(),
            "missing affiliate credentials: ALIEXPRESS_APP_SECRET, ALIEXPRESS_TRACKING_ID"
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("123", "top-secret", "default");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));

        let config = CredentialsConfig {
            app_secret: Some("top-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("top-secret"));
    }
}
