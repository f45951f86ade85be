//! Tower middleware for socket-agent routers

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use socket_agent_auth::TokenValidator;
use socket_agent_core::WELL_KNOWN_PATH;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::extract::{authenticated_user, AuthContext};

/// Authentication middleware
///
/// Validates a `Bearer` token when one is present and records the outcome as
/// an [`AuthContext`]. Requests are never rejected here; protected routes
/// carry [`require_auth`].
///
/// The discovery document itself is served without a token lookup. Other
/// routes under `/.well-known/` are authenticated like any other route.
pub async fn auth_middleware(
    State(validator): State<Arc<TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == WELL_KNOWN_PATH {
        request.extensions_mut().insert(AuthContext::Anonymous);
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer)
        .map(str::to_string);

    let context = match token {
        Some(token) => AuthContext::from_verdict(validator.validate(&token).await),
        None => AuthContext::Anonymous,
    };

    if let AuthContext::Rejected { reason } = &context {
        tracing::debug!(path = %request.uri().path(), reason = %reason, "Bearer token rejected");
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Route guard for endpoints that require authentication.
/// Answers 401 before the handler runs.
pub async fn require_auth(request: Request, next: Next) -> Response {
    match authenticated_user(request.extensions()) {
        Ok(_) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Extract the token from an Authorization header value
pub fn extract_bearer(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Request tracing middleware
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let user = request
        .extensions()
        .get::<AuthContext>()
        .and_then(|c| c.user())
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let span = tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        user = %user,
    );

    let response = next.run(request).instrument(span).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

/// Request ID middleware
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("X-Request-ID", value);
    }

    response
}

/// Request ID wrapper
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, http::StatusCode, middleware, routing::get, Router};
    use socket_agent_auth::{AuthConfig, MockIdentityClient};
    use tower::ServiceExt;

    fn validator(mock: Arc<MockIdentityClient>) -> Arc<TokenValidator> {
        Arc::new(TokenValidator::with_client(AuthConfig::default(), mock))
    }

    async fn whoami(request: Request) -> String {
        match request.extensions().get::<AuthContext>() {
            Some(AuthContext::Authenticated(user)) => user.username.clone(),
            Some(AuthContext::Rejected { reason }) => format!("rejected: {}", reason),
            Some(AuthContext::Anonymous) => "anonymous".to_string(),
            None => "none".to_string(),
        }
    }

    async fn body_text(response: Response) -> String {
        use http_body_util::BodyExt;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("abc"), None);
    }

    #[tokio::test]
    async fn test_auth_middleware_sets_context() {
        let mock = Arc::new(
            MockIdentityClient::new().with_user("abc", MockIdentityClient::user(7, "ada")),
        );
        let app = Router::new()
            .route("/", get(whoami))
            .layer(middleware::from_fn_with_state(validator(mock.clone()), auth_middleware));

        let cases = [
            (None, "anonymous"),
            (Some("Bearer abc"), "ada"),
            (Some("Bearer nope"), "rejected: Invalid token"),
            (Some("Token abc"), "anonymous"),
        ];

        for (header_value, expected) in cases {
            let mut builder = http::Request::builder().uri("/");
            if let Some(v) = header_value {
                builder = builder.header(header::AUTHORIZATION, v);
            }
            let response = app
                .clone()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, expected);
        }

        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_only_discovery_path_skips_validation() {
        let mock = Arc::new(
            MockIdentityClient::new().with_user("abc", MockIdentityClient::user(7, "ada")),
        );
        let app = Router::new()
            .route("/.well-known/socket-agent", get(whoami))
            .route("/.well-known/status", get(whoami))
            .route("/.well-knownfoo", get(whoami))
            .layer(middleware::from_fn_with_state(validator(mock.clone()), auth_middleware));

        let cases = [
            ("/.well-known/socket-agent", "anonymous"),
            ("/.well-known/status", "ada"),
            ("/.well-knownfoo", "ada"),
        ];

        for (uri, expected) in cases {
            let request = http::Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, "Bearer abc")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(body_text(response).await, expected, "{}", uri);
        }

        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_require_auth_without_context() {
        let app = Router::new()
            .route("/", get(|| async { "secret" }))
            .route_layer(middleware::from_fn(require_auth));

        let response = app
            .oneshot(http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(tracing_middleware))
            .layer(middleware::from_fn(request_id_middleware));

        let response = app
            .oneshot(http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get("X-Request-ID").unwrap();
        assert_eq!(id.to_str().unwrap().len(), 36);
    }
}
