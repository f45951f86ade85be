//! Cached token validation
//!
//! Combines a [`TokenCache`] with an [`IdentityClient`]: a cache miss costs
//! exactly one outbound call, and only definitive answers are cached.

use std::sync::Arc;

use crate::cache::{TokenCache, MAX_CACHE_TTL};
use crate::config::AuthConfig;
use crate::identity::{HttpIdentityClient, IdentityClient, IdentityError};
use crate::verdict::TokenVerdict;

/// Validates bearer tokens against an identity service
#[derive(Debug)]
pub struct TokenValidator {
    config: AuthConfig,
    cache: TokenCache,
    client: Arc<dyn IdentityClient>,
}

impl TokenValidator {
    /// Create a validator that talks HTTP to the configured identity service
    pub fn new(config: AuthConfig) -> Result<Self, IdentityError> {
        let client = HttpIdentityClient::new(&config)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a validator with a custom identity client
    pub fn with_client(mut config: AuthConfig, client: Arc<dyn IdentityClient>) -> Self {
        config.cache_ttl = config.cache_ttl.min(MAX_CACHE_TTL);
        Self {
            cache: TokenCache::new(config.cache_ttl),
            config,
            client,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Validate `token`, consulting the cache first
    pub async fn validate(&self, token: &str) -> TokenVerdict {
        if let Some(verdict) = self.cache.get(token).await {
            tracing::debug!(valid = verdict.is_valid(), "Token cache hit");
            return verdict;
        }

        match self.client.fetch_user(token).await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, client = self.client.name(), "Token validated");
                let verdict = TokenVerdict::valid(user);
                self.cache.insert(token, verdict.clone()).await;
                verdict
            }
            Err(e) if e.is_definitive() => {
                tracing::debug!(client = self.client.name(), "Token rejected by identity service");
                let verdict = TokenVerdict::invalid(e.to_string());
                self.cache.insert(token, verdict.clone()).await;
                verdict
            }
            Err(e) => {
                // Not cached: the next request retries
                tracing::warn!(error = %e, client = self.client.name(), "Token validation failed");
                TokenVerdict::invalid(e.to_string())
            }
        }
    }
}
