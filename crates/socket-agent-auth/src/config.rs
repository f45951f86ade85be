//! Configuration for token validation
//!
//! Reads identity service settings from the environment.

use socket_agent_core::{
    AuthSettings, TokenValidation, DEFAULT_CACHE_TTL_SECS, DEFAULT_IDENTITY_SERVICE_URL,
    DEFAULT_VALIDATE_ENDPOINT,
};
use std::env;
use std::time::Duration;

use crate::cache::MAX_CACHE_TTL;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Token validation settings
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    /// Identity service base URL (env: SOCKET_AGENT_IDENTITY_URL)
    pub identity_service_url: String,
    /// Token audience (env: SOCKET_AGENT_AUDIENCE)
    pub audience: Option<String>,
    /// Server ID for token discovery (env: SOCKET_AGENT_SERVER_ID)
    pub server_id: Option<String>,
    /// How long a verdict stays cached (env: SOCKET_AGENT_CACHE_TTL_SECS)
    pub cache_ttl: Duration,
    /// Timeout for each validation call (env: SOCKET_AGENT_TIMEOUT_SECS)
    pub timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_service_url: DEFAULT_IDENTITY_SERVICE_URL.to_string(),
            audience: None,
            server_id: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            timeout: Duration::from_secs(5),
        }
    }
}

impl AuthConfig {
    /// Config for an identity service at `url` with default TTL and timeout
    pub fn new(identity_service_url: impl Into<String>) -> Self {
        Self {
            identity_service_url: identity_service_url.into(),
            ..Default::default()
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }

    /// Clamped to [`MAX_CACHE_TTL`]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl.min(MAX_CACHE_TTL);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache_ttl = match lookup("SOCKET_AGENT_CACHE_TTL_SECS") {
            Some(v) => {
                let secs = parse_secs("SOCKET_AGENT_CACHE_TTL_SECS", &v)?;
                if secs > MAX_CACHE_TTL.as_secs() {
                    return Err(ConfigError::Invalid(format!(
                        "SOCKET_AGENT_CACHE_TTL_SECS must be at most {} seconds, got {}",
                        MAX_CACHE_TTL.as_secs(),
                        secs
                    )));
                }
                Duration::from_secs(secs)
            }
            None => defaults.cache_ttl,
        };
        let timeout = match lookup("SOCKET_AGENT_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_secs("SOCKET_AGENT_TIMEOUT_SECS", &v)?),
            None => defaults.timeout,
        };

        Ok(Self {
            identity_service_url: lookup("SOCKET_AGENT_IDENTITY_URL")
                .unwrap_or(defaults.identity_service_url),
            audience: lookup("SOCKET_AGENT_AUDIENCE"),
            server_id: lookup("SOCKET_AGENT_SERVER_ID"),
            cache_ttl,
            timeout,
        })
    }

    /// Validation URL on the identity service
    pub fn validate_url(&self) -> String {
        format!(
            "{}{}",
            self.identity_service_url.trim_end_matches('/'),
            DEFAULT_VALIDATE_ENDPOINT
        )
    }

    /// Validation settings as published in the descriptor
    pub fn token_validation(&self) -> TokenValidation {
        TokenValidation {
            cache_ttl: self.cache_ttl.as_secs(),
            validate_endpoint: DEFAULT_VALIDATE_ENDPOINT.to_string(),
        }
    }

    /// Descriptor auth settings derived from this config
    pub fn auth_settings(&self) -> AuthSettings {
        let defaults = AuthSettings::default();
        AuthSettings {
            identity_service_url: self.identity_service_url.clone(),
            server_id: self.server_id.clone(),
            audience: self.audience.clone().unwrap_or(defaults.audience),
            description: defaults.description,
            token_validation: Some(self.token_validation()),
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} must be a number of seconds, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.identity_service_url, "https://socketagent.io");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.audience.is_none());
    }

    #[test]
    fn test_from_vars() {
        let config = AuthConfig::from_vars(vars(&[
            ("SOCKET_AGENT_IDENTITY_URL", "http://id.local/"),
            ("SOCKET_AGENT_AUDIENCE", "todo-api"),
            ("SOCKET_AGENT_CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.validate_url(), "http://id.local/v1/me");
        assert_eq!(config.audience.as_deref(), Some("todo-api"));
        assert_eq!(config.token_validation().cache_ttl, 60);
    }

    #[test]
    fn test_invalid_number() {
        let result = AuthConfig::from_vars(vars(&[("SOCKET_AGENT_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cache_ttl_upper_bound() {
        let result = AuthConfig::from_vars(vars(&[("SOCKET_AGENT_CACHE_TTL_SECS", "100000000000")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let max = MAX_CACHE_TTL.as_secs().to_string();
        let config = AuthConfig::from_vars(vars(&[("SOCKET_AGENT_CACHE_TTL_SECS", max.as_str())])).unwrap();
        assert_eq!(config.cache_ttl, MAX_CACHE_TTL);
    }

    #[test]
    fn test_auth_settings_default_audience() {
        let settings = AuthConfig::new("http://id.local").auth_settings();
        assert_eq!(settings.audience, "api");
        assert_eq!(settings.identity_service_url, "http://id.local");
        assert!(settings.token_validation.is_some());
    }
}
