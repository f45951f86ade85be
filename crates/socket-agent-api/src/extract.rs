//! Per-request authentication context and extractors
//!
//! [`auth_middleware`](crate::middleware::auth_middleware) stores an
//! [`AuthContext`] in the request extensions. Handlers read it through
//! [`CurrentUser`] (mandatory) or [`MaybeUser`] (optional).

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, Extensions};
use socket_agent_auth::{TokenVerdict, User};

use crate::error::ApiError;

/// Outcome of authenticating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// No bearer token was presented
    Anonymous,
    /// The token resolved to a user
    Authenticated(User),
    /// A token was presented and rejected
    Rejected { reason: String },
}

impl AuthContext {
    pub fn from_verdict(verdict: TokenVerdict) -> Self {
        match verdict {
            TokenVerdict::Valid { user } => AuthContext::Authenticated(user),
            TokenVerdict::Invalid { reason } => AuthContext::Rejected { reason },
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthContext::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The authenticated user, or the 401 a protected route answers with
    pub fn require_user(&self) -> Result<&User, ApiError> {
        match self {
            AuthContext::Authenticated(user) => Ok(user),
            AuthContext::Rejected { reason } => Err(ApiError::Unauthorized(reason.clone())),
            AuthContext::Anonymous => Err(unauthenticated()),
        }
    }
}

pub(crate) fn unauthenticated() -> ApiError {
    ApiError::Unauthorized("Authentication required".to_string())
}

/// Resolve the user from request extensions, treating a missing context as anonymous
pub(crate) fn authenticated_user(extensions: &Extensions) -> Result<User, ApiError> {
    match extensions.get::<AuthContext>() {
        Some(context) => context.require_user().cloned(),
        None => Err(unauthenticated()),
    }
}

/// The authenticated user. Rejects with 401 when there is none.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticated_user(&parts.extensions).map(CurrentUser)
    }
}

/// The authenticated user if any. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|context| context.user().cloned());
        Ok(MaybeUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn user() -> User {
        User {
            id: 7,
            username: "ada".to_string(),
            email: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn parts_with(context: Option<AuthContext>) -> Parts {
        let mut request = Request::builder().uri("/").body(()).unwrap();
        if let Some(context) = context {
            request.extensions_mut().insert(context);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_current_user_from_authenticated_context() {
        let mut parts = parts_with(Some(AuthContext::Authenticated(user())));
        let CurrentUser(found) = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.id, 7);
    }

    #[tokio::test]
    async fn test_current_user_rejections() {
        let mut parts = parts_with(None);
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Authentication required"));

        let mut parts = parts_with(Some(AuthContext::Rejected {
            reason: "Invalid token".to_string(),
        }));
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid token"));
    }

    #[tokio::test]
    async fn test_maybe_user_never_rejects() {
        let mut parts = parts_with(Some(AuthContext::Rejected {
            reason: "Invalid token".to_string(),
        }));
        let MaybeUser(found) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());

        let mut parts = parts_with(Some(AuthContext::Authenticated(user())));
        let MaybeUser(found) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("ada".to_string()));
    }

    #[test]
    fn test_context_from_verdict() {
        assert_eq!(
            AuthContext::from_verdict(TokenVerdict::invalid("Invalid token")),
            AuthContext::Rejected {
                reason: "Invalid token".to_string()
            }
        );
        assert!(AuthContext::from_verdict(TokenVerdict::valid(user()))
            .user()
            .is_some());
    }
}
