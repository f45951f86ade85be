//! Identity service client
//!
//! Validates a bearer token by asking the identity service who it belongs to.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::verdict::User;

/// Errors from the identity service
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Validation failed: {0}")]
    UnexpectedStatus(u16),
    #[error("Validation error: {0}")]
    Transport(String),
    #[error("Validation error: invalid user payload: {0}")]
    Decode(String),
}

impl IdentityError {
    /// Whether the identity service gave a definitive answer about the token.
    /// Only definitive answers may be cached.
    pub fn is_definitive(&self) -> bool {
        matches!(self, IdentityError::InvalidToken)
    }
}

/// Trait for identity services that can resolve a token to a user
#[async_trait]
pub trait IdentityClient: Send + Sync + std::fmt::Debug {
    /// Client name for logs
    fn name(&self) -> &str;

    /// Resolve a bearer token to its user
    async fn fetch_user(&self, token: &str) -> Result<User, IdentityError>;
}

/// HTTP client for `GET /v1/me`
#[derive(Debug)]
pub struct HttpIdentityClient {
    validate_url: String,
    client: reqwest::Client,
}

impl HttpIdentityClient {
    /// Create a client from auth config. The config's timeout applies to every call.
    pub fn new(config: &AuthConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(Self {
            validate_url: config.validate_url(),
            client,
        })
    }

    pub fn validate_url(&self) -> &str {
        &self.validate_url
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_user(&self, token: &str) -> Result<User, IdentityError> {
        let response = self
            .client
            .get(&self.validate_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<User>()
                .await
                .map_err(|e| IdentityError::Decode(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(IdentityError::InvalidToken),
            status => Err(IdentityError::UnexpectedStatus(status.as_u16())),
        }
    }
}
