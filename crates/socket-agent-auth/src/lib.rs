//! # socket-agent auth
//!
//! Bearer token validation against an external identity service.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`TokenValidator`] | cache lookup, then one `/v1/me` call on a miss |
//! | [`TokenCache`] | SHA-256-keyed verdicts with a fixed TTL |
//! | [`HttpIdentityClient`] | reqwest client with a per-call timeout |
//! | [`MockIdentityClient`] | in-memory client for tests |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use socket_agent_auth::{AuthConfig, MockIdentityClient, TokenValidator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let identity = MockIdentityClient::new()
//!         .with_user("abc", MockIdentityClient::user(7, "ada"));
//!     let validator = TokenValidator::with_client(AuthConfig::default(), Arc::new(identity));
//!
//!     let verdict = validator.validate("abc").await;
//!     assert_eq!(verdict.user().map(|u| u.id), Some(7));
//! }
//! ```
//!
//! ## Against a real identity service
//!
//! ```rust,ignore
//! use socket_agent_auth::{AuthConfig, TokenValidator};
//!
//! let validator = TokenValidator::new(AuthConfig::from_env()?)?;
//! ```

pub mod cache;
pub mod config;
pub mod identity;
pub mod mock;
pub mod validator;
pub mod verdict;

pub use cache::{hash_token, TokenCache, MAX_CACHE_TTL};
pub use config::{AuthConfig, ConfigError};
pub use identity::{HttpIdentityClient, IdentityClient, IdentityError};
pub use mock::MockIdentityClient;
pub use validator::TokenValidator;
pub use verdict::{TokenVerdict, User};
