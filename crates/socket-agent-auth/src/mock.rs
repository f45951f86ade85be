//! Mock identity client for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::identity::{IdentityClient, IdentityError};
use crate::verdict::User;

/// An identity client backed by a fixed token table.
/// Counts every call so tests can assert on outbound traffic.
#[derive(Debug, Default)]
pub struct MockIdentityClient {
    users: RwLock<HashMap<String, User>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MockIdentityClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token that resolves to `user`
    pub fn with_user(self, token: &str, user: User) -> Self {
        self.add_user(token, user);
        self
    }

    pub fn add_user(&self, token: &str, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(token.to_string(), user);
        }
    }

    /// Simulate a network outage (every call fails with a transport error)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `fetch_user` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Convenience user for tests
    pub fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }
}

#[async_trait]
impl IdentityClient for MockIdentityClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_user(&self, token: &str) -> Result<User, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Transport("connection refused".to_string()));
        }

        let users = self
            .users
            .read()
            .map_err(|_| IdentityError::Transport("mock lock poisoned".to_string()))?;
        users.get(token).cloned().ok_or(IdentityError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_resolves_known_tokens() {
        let mock = MockIdentityClient::new().with_user("abc", MockIdentityClient::user(7, "ada"));

        assert_eq!(mock.fetch_user("abc").await.unwrap().id, 7);
        assert!(matches!(
            mock.fetch_user("nope").await,
            Err(IdentityError::InvalidToken)
        ));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let mock = MockIdentityClient::new().with_user("abc", MockIdentityClient::user(7, "ada"));
        mock.set_unavailable(true);

        assert!(matches!(
            mock.fetch_user("abc").await,
            Err(IdentityError::Transport(_))
        ));
    }
}
