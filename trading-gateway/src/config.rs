//! Configuration types for venue adapters.
//!
//! [`VenueConfig`] is the adapter initialization payload
//! (`{url, apiKey, secretKey, password}`). It can come from JSON, TOML, or
//! the environment. [`GatewayConfig`] groups several venues in one TOML file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{VenueError, VenueResult};

/// Initialization payload of one venue adapter.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueConfig {
    /// REST base URL; empty selects the venue's production host
    #[serde(default)]
    pub url: String,
    /// Separate derivatives REST host, for venues that have one
    #[serde(default, alias = "futures_url")]
    pub futures_url: Option<String>,
    /// API key
    #[serde(default, alias = "api_key")]
    pub api_key: String,
    /// API secret
    #[serde(default, alias = "secret_key")]
    pub secret_key: String,
    /// Passphrase, required only by venues that use one
    #[serde(default)]
    pub password: String,
    /// Environment variables to read credentials from when they are not inline
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// REST API configuration
    #[serde(default)]
    pub rest: RestConfig,
}

impl fmt::Debug for VenueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueConfig")
            .field("url", &self.url)
            .field("futures_url", &self.futures_url)
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("password", &"<redacted>")
            .field("rest", &self.rest)
            .finish()
    }
}

impl VenueConfig {
    /// Create a config with inline credentials and the default host.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Set the REST base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the derivatives REST base URL.
    pub fn with_futures_url(mut self, url: impl Into<String>) -> Self {
        self.futures_url = Some(url.into());
        self
    }

    /// Set the passphrase.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Parse the JSON initialization payload.
    pub fn from_json(payload: &[u8]) -> VenueResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| VenueError::Configuration(format!("invalid venue config JSON: {}", e)))
    }

    /// Parse a TOML venue table.
    pub fn from_toml_str(toml_str: &str) -> VenueResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| VenueError::Configuration(format!("invalid venue config TOML: {}", e)))
    }

    /// Read `{PREFIX}_URL`, `{PREFIX}_API_KEY`, `{PREFIX}_SECRET_KEY`,
    /// `{PREFIX}_PASSWORD` and `{PREFIX}_FUTURES_URL`.
    pub fn from_env(prefix: &str) -> VenueResult<Self> {
        let var = |name: &str| std::env::var(format!("{}_{}", prefix, name)).ok();
        let api_key = var("API_KEY")
            .ok_or_else(|| VenueError::Configuration(format!("{}_API_KEY is not set", prefix)))?;
        let secret_key = var("SECRET_KEY")
            .ok_or_else(|| VenueError::Configuration(format!("{}_SECRET_KEY is not set", prefix)))?;

        Ok(Self {
            url: var("URL").unwrap_or_default(),
            futures_url: var("FUTURES_URL"),
            api_key,
            secret_key,
            password: var("PASSWORD").unwrap_or_default(),
            auth: None,
            rest: RestConfig::default(),
        })
    }

    /// Fill missing inline credentials from the `auth` environment variables.
    pub fn resolve_credentials(mut self) -> Self {
        if let Some(auth) = &self.auth {
            if self.api_key.is_empty() {
                self.api_key = auth.load_api_key().unwrap_or_default();
            }
            if self.secret_key.is_empty() {
                self.secret_key = auth.load_api_secret().unwrap_or_default();
            }
            if self.password.is_empty() {
                self.password = auth.load_passphrase().unwrap_or_default();
            }
        }
        self
    }

    /// Check that the credentials a venue needs are present.
    pub fn validate(&self, requires_passphrase: bool) -> VenueResult<()> {
        if self.api_key.is_empty() {
            return Err(VenueError::Configuration("apiKey is empty".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(VenueError::Configuration("secretKey is empty".to_string()));
        }
        if requires_passphrase && self.password.is_empty() {
            return Err(VenueError::Configuration(
                "password is required for this venue".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL, falling back to `default` when none is configured.
    pub fn url_or(&self, default: &str) -> String {
        if self.url.is_empty() {
            default.to_string()
        } else {
            self.url.clone()
        }
    }
}

/// REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Receive window in milliseconds (for timestamp validation)
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
}

fn default_timeout_ms() -> u64 {
    2_000
}

fn default_recv_window_ms() -> u64 {
    5_000
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            recv_window_ms: default_recv_window_ms(),
        }
    }
}

impl RestConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Names of the environment variables holding credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Environment variable name for API key
    pub api_key_env: String,
    /// Environment variable name for API secret
    pub api_secret_env: String,
    /// Optional passphrase environment variable (for some venues)
    pub passphrase_env: Option<String>,
}

impl AuthConfig {
    /// Create a new auth config with environment variable names.
    pub fn new(api_key_env: impl Into<String>, api_secret_env: impl Into<String>) -> Self {
        Self {
            api_key_env: api_key_env.into(),
            api_secret_env: api_secret_env.into(),
            passphrase_env: None,
        }
    }

    /// Add a passphrase environment variable.
    pub fn with_passphrase(mut self, env: impl Into<String>) -> Self {
        self.passphrase_env = Some(env.into());
        self
    }

    /// Load API key from environment.
    pub fn load_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }

    /// Load API secret from environment.
    pub fn load_api_secret(&self) -> Option<String> {
        std::env::var(&self.api_secret_env).ok()
    }

    /// Load passphrase from environment.
    pub fn load_passphrase(&self) -> Option<String> {
        self.passphrase_env
            .as_ref()
            .and_then(|env| std::env::var(env).ok())
    }
}

/// Configuration of every venue the gateway should connect to.
///
/// ```toml
/// [venues.binance]
/// apiKey = "..."
/// secretKey = "..."
///
/// [venues.okx]
/// url = "https://www.okx.com"
/// auth = { api_key_env = "OKX_API_KEY", api_secret_env = "OKX_SECRET_KEY", passphrase_env = "OKX_PASSWORD" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Venue configs keyed by venue identifier
    #[serde(default)]
    pub venues: BTreeMap<String, VenueConfig>,
}

impl GatewayConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(toml_str: &str) -> VenueResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| VenueError::Configuration(format!("invalid gateway config: {}", e)))
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> VenueResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VenueError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_config_defaults() {
        let config = RestConfig::default();
        assert_eq!(config.timeout_ms, 2_000);
        assert_eq!(config.recv_window_ms, 5_000);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_json_init_payload() {
        let payload = br#"{"url":"https://www.okx.com","apiKey":"k","secretKey":"s","password":"p"}"#;
        let config = VenueConfig::from_json(payload).unwrap();
        assert_eq!(config.url, "https://www.okx.com");
        assert_eq!(config.api_key, "k");
        assert_eq!(config.secret_key, "s");
        assert_eq!(config.password, "p");
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_json_payload_rejects_garbage() {
        assert!(matches!(
            VenueConfig::from_json(b"not json"),
            Err(VenueError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_requires_passphrase() {
        let config = VenueConfig::new("k", "s");
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_err());
        assert!(VenueConfig::new("", "s").validate(false).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = VenueConfig::new("k", "very-secret").with_password("phrase");
        let text = format!("{:?}", config);
        assert!(!text.contains("very-secret"));
        assert!(!text.contains("phrase"));
    }

    #[test]
    fn test_gateway_config_deserialization() {
        let toml_str = r#"
            [venues.binance]
            api_key = "bk"
            secret_key = "bs"
            futuresUrl = "https://testnet.binancefuture.com"

            [venues.binance.rest]
            timeout_ms = 5000

            [venues.okx]
            url = "https://www.okx.com"
            apiKey = "ok"
            secretKey = "os"
            password = "op"
        "#;

        let config = GatewayConfig::from_toml_str(toml_str).unwrap();
        let binance = &config.venues["binance"];
        assert_eq!(binance.api_key, "bk");
        assert_eq!(
            binance.futures_url.as_deref(),
            Some("https://testnet.binancefuture.com")
        );
        assert_eq!(binance.rest.timeout_ms, 5000);
        assert_eq!(binance.rest.recv_window_ms, 5_000);
        assert_eq!(config.venues["okx"].password, "op");
    }

    #[test]
    fn test_credentials_from_auth_env() {
        std::env::set_var("GATEWAY_CFG_TEST_KEY", "env-key");
        std::env::set_var("GATEWAY_CFG_TEST_SECRET", "env-secret");

        let config = VenueConfig {
            auth: Some(AuthConfig::new("GATEWAY_CFG_TEST_KEY", "GATEWAY_CFG_TEST_SECRET")),
            ..Default::default()
        }
        .resolve_credentials();

        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.secret_key, "env-secret");
        assert!(config.password.is_empty());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("GATEWAY_ENV_TEST_API_KEY", "k");
        std::env::set_var("GATEWAY_ENV_TEST_SECRET_KEY", "s");
        std::env::set_var("GATEWAY_ENV_TEST_PASSWORD", "p");

        let config = VenueConfig::from_env("GATEWAY_ENV_TEST").unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.password, "p");
        assert!(config.url.is_empty());

        assert!(VenueConfig::from_env("GATEWAY_ENV_MISSING").is_err());
    }

    #[test]
    fn test_url_or_default() {
        let config = VenueConfig::new("k", "s");
        assert_eq!(config.url_or("https://api.binance.com"), "https://api.binance.com");
        assert_eq!(
            config.with_url("http://127.0.0.1:9000").url_or("https://api.binance.com"),
            "http://127.0.0.1:9000"
        );
    }
}
