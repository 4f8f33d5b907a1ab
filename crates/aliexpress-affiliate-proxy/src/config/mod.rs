//! Configuration types for the affiliate proxy.
//!
//! Configuration is read from an optional YAML file and then overlaid with
//! environment variables, so credentials never have to live on disk.

mod credentials;
mod listen;
mod upstream;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use credentials::{
    ConfigurationError, Credentials, CredentialsConfig, ENV_APP_KEY, ENV_APP_SECRET,
    ENV_TRACKING_ID,
};
pub use listen::{AuthConfig, ListenConfig};
pub use upstream::{UpstreamConfig, DEFAULT_UPSTREAM_URL};

pub const ENV_FORCE_MOCK: &str = "AFFILIATE_PROXY_FORCE_MOCK";
pub const ENV_UPSTREAM_URL: &str = "AFFILIATE_PROXY_UPSTREAM_URL";
pub const ENV_UPSTREAM_TIMEOUT: &str = "AFFILIATE_PROXY_UPSTREAM_TIMEOUT_SECS";
pub const ENV_API_KEYS: &str = "AFFILIATE_PROXY_API_KEYS";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub mock: MockConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Mock mode settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MockConfig {
    /// Skip the upstream entirely and always answer with generated data.
    #[serde(default)]
    pub force: bool,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the config file (if any), overlay the process environment and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup. Set variables win over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_APP_KEY) {
            self.credentials.app_key = Some(v);
        }
        if let Some(v) = lookup(ENV_APP_SECRET) {
            self.credentials.app_secret = Some(v);
        }
        if let Some(v) = lookup(ENV_TRACKING_ID) {
            self.credentials.tracking_id = Some(v);
        }
        if let Some(v) = lookup(ENV_FORCE_MOCK) {
            self.mock.force = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = lookup(ENV_UPSTREAM_URL) {
            self.upstream.base_url = v;
        }
        if let Some(v) = lookup(ENV_UPSTREAM_TIMEOUT) {
            // Unparseable values keep the configured timeout
            if let Ok(secs) = v.trim().parse() {
                self.upstream.timeout_secs = secs;
            }
        }
        if let Some(v) = lookup(ENV_API_KEYS) {
            self.auth.api_keys = v
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    /// Validate configuration. Missing credentials are not an error here: the
    /// service starts in a degraded state and reports it.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.upstream
            .validate()
            .map_err(|e| anyhow::anyhow!(ConfigurationError::Invalid(e)))?;

        if self.auth.api_keys.iter().any(|k| k.trim().is_empty()) {
            anyhow::bail!(ConfigurationError::Invalid(
                "auth.api_keys must not contain empty keys".to_string()
            ));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigurationError> {
        self.credentials.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
listen:
  host: 127.0.0.1
  port: 3000
upstream:
  base_url: "https://api-sg.aliexpress.com/sync"
  timeout_secs: 5
credentials:
  app_key: "123"
  tracking_id: "gpt"
mock:
  force: false
auth:
  api_keys: ["k1", "k2"]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listen.port, 3000);
        assert_eq!(config.listen.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.upstream.connect_timeout_secs, 5);
        assert_eq!(config.credentials.app_key.as_deref(), Some("123"));
        assert!(config.credentials.app_secret.is_none());
        assert!(!config.mock.force);
        assert!(config.auth.accepts("k2"));
        assert!(!config.auth.accepts("k3"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.listen.port, 8080);
        assert_eq!(config.upstream.base_url, DEFAULT_UPSTREAM_URL);
        assert!(!config.auth.is_enabled());
        assert!(matches!(
            config.credentials(),
            Err(ConfigurationError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: Config = serde_yaml::from_str(
            r#"
credentials:
  app_key: "from-file"
  app_secret: "file-secret"
  tracking_id: "file-tracking"
"#,
        )
        .unwrap();

        config.apply_env(env_from(&[
            (ENV_APP_KEY, "from-env"),
            (ENV_FORCE_MOCK, "TRUE"),
            (ENV_API_KEYS, "a, b,,"),
            (ENV_UPSTREAM_TIMEOUT, "3"),
        ]));

        let creds = config.credentials().unwrap();
        assert_eq!(creds.app_key, "from-env");
        assert_eq!(creds.app_secret, "file-secret");
        assert!(config.mock.force);
        assert_eq!(config.auth.api_keys, vec!["a", "b"]);
        assert_eq!(config.upstream.timeout_secs, 3);
    }

    #[test]
    fn test_env_ignores_bad_timeout() {
        let mut config = Config::default();
        config.apply_env(env_from(&[(ENV_UPSTREAM_TIMEOUT, "soon")]));
        assert_eq!(config.upstream.timeout_secs, 10);
    }

    #[test]
    fn test_validate_rejects_bad_upstream() {
        let mut config = Config::default();
        config.apply_env(env_from(&[(ENV_UPSTREAM_URL, "not-a-url")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mock:\n  force: true\nlisten:\n  port: 9999").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(config.mock.force);
        assert_eq!(config.listen.port, 9999);
    }

    #[test]
    fn test_from_file_rejects_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen: [not, a, map]").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_load_reads_process_environment() {
        std::env::set_var(ENV_APP_KEY, "env-key");
        std::env::set_var(ENV_APP_SECRET, "env-secret");
        std::env::set_var(ENV_TRACKING_ID, "env-tracking");

        let config = Config::load(None).unwrap();

        std::env::remove_var(ENV_APP_KEY);
        std::env::remove_var(ENV_APP_SECRET);
        std::env::remove_var(ENV_TRACKING_ID);

        let creds = config.credentials().unwrap();
        assert_eq!(creds, Credentials::new("env-key", "env-secret", "env-tracking"));
    }
}
