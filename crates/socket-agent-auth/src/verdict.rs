//! Identity and validation verdict types

use serde::{Deserialize, Serialize};

/// User returned by the identity service's `/v1/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: String,
}

/// Outcome of validating a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenVerdict {
    Valid { user: User },
    Invalid { reason: String },
}

impl TokenVerdict {
    pub fn valid(user: User) -> Self {
        TokenVerdict::Valid { user }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        TokenVerdict::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenVerdict::Valid { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            TokenVerdict::Valid { user } => Some(user),
            TokenVerdict::Invalid { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            TokenVerdict::Valid { .. } => None,
            TokenVerdict::Invalid { reason } => Some(reason),
        }
    }
}
