//! Client configuration
//!
//! `ClientConfig` can be built in code, loaded from YAML, or overlaid with
//! `EODH_*` environment variables.

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use crate::types::{BackoffType, Environment, OptionStringExt, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default page size for paged endpoints
pub const PAGINATION_LIMIT: u32 = 10;

/// Environment variable names read by [`ClientConfig::with_env`]
pub mod env {
    pub const BASE_URL: &str = "EODH_BASE_URL";
    pub const ENVIRONMENT: &str = "EODH_ENVIRONMENT";
    pub const USERNAME: &str = "EODH_USERNAME";
    pub const TOKEN: &str = "EODH_TOKEN";
    pub const DEBUG: &str = "EODH_DEBUG";
}

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for [`crate::Client`]
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Hub deployment; decides the base URL unless `base_url` is set
    pub environment: Environment,

    /// Explicit base URL, overrides `environment`
    pub base_url: Option<String>,

    /// Hub username, also the default workspace name
    pub username: Option<String>,

    /// API token, sent as a bearer token
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Transport-level retries for 429/5xx/timeouts (0 = never retry)
    pub max_retries: u32,

    pub backoff: BackoffType,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,

    /// Optional client-side rate limit
    pub rate_limit: Option<RateLimiterConfig>,

    pub user_agent: String,

    /// Page size requested from paged endpoints
    pub pagination_limit: u32,

    /// Extra headers sent with every request
    pub headers: StringMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            username: None,
            token: None,
            timeout_secs: 30,
            max_retries: 0,
            backoff: BackoffType::Exponential,
            initial_backoff_ms: 100,
            max_backoff_ms: 60_000,
            rate_limit: None,
            user_agent: format!("eodh-rs/{}", env!("CARGO_PKG_VERSION")),
            pagination_limit: PAGINATION_LIMIT,
            headers: StringMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Default config overlaid with `EODH_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay `EODH_*` environment variables onto this config
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = var(env::ENVIRONMENT).none_if_empty() {
            self.environment = Environment::parse(&value).ok_or_else(|| {
                Error::config(format!("Unknown environment '{value}' in {}", env::ENVIRONMENT))
            })?;
        }
        if let Some(url) = var(env::BASE_URL).none_if_empty() {
            self.base_url = Some(url);
        }
        if let Some(username) = var(env::USERNAME).none_if_empty() {
            self.username = Some(username);
        }
        if let Some(token) = var(env::TOKEN).none_if_empty() {
            self.token = Some(token);
        }
        self.validate()?;
        Ok(self)
    }

    /// Resolved base URL without a trailing slash
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.pagination_limit == 0 {
            return Err(Error::config("pagination_limit must be greater than 0"));
        }
        if let Some(url) = &self.base_url {
            url::Url::parse(url)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("rate_limit", &self.rate_limit)
            .field("pagination_limit", &self.pagination_limit)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the hub deployment
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the API token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs();
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff = backoff_type;
        self.config.initial_backoff_ms = initial.as_millis() as u64;
        self.config.max_backoff_ms = max.as_millis() as u64;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set the page size for paged endpoints
    pub fn pagination_limit(mut self, limit: u32) -> Self {
        self.config.pagination_limit = limit;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.base_url(), "https://eodatahub.org.uk");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.pagination_limit, PAGINATION_LIMIT);
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .environment(Environment::Staging)
            .username("alice")
            .token("secret")
            .max_retries(2)
            .pagination_limit(25)
            .header("X-Trace", "1")
            .build();

        assert_eq!(config.base_url(), "https://staging.eodatahub.org.uk");
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.pagination_limit, 25);
        assert_eq!(config.headers.get("X-Trace"), Some(&"1".to_string()));
    }

    #[test]
    fn test_base_url_override_strips_slash() {
        let config = ClientConfig::builder()
            .environment(Environment::Test)
            .base_url("http://localhost:8080/")
            .build();
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r"
environment: test
username: bob
timeout_secs: 5
rate_limit:
  requests_per_second: 2
";
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.username.as_deref(), Some("bob"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.rate_limit.unwrap().requests_per_second, 2);
        assert_eq!(config.pagination_limit, PAGINATION_LIMIT);
    }

    #[test]
    fn test_yaml_config_rejects_zero_page_size() {
        let err = ClientConfig::from_yaml_str("pagination_limit: 0").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: https://hub.example.com").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url(), "https://hub.example.com");

        assert!(ClientConfig::from_file("/nonexistent/eodh.yaml").is_err());
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (env::ENVIRONMENT, "staging"),
            (env::USERNAME, "carol"),
            (env::TOKEN, "tok"),
            (env::BASE_URL, ""),
        ]);
        let config = ClientConfig::default()
            .with_vars(|name| vars.get(name).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.username.as_deref(), Some("carol"));
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_env_overlay_unknown_environment() {
        let result = ClientConfig::default().with_vars(|name| {
            (name == env::ENVIRONMENT).then(|| "moon".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::builder().token("super-secret").build();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("***"));
    }
}
