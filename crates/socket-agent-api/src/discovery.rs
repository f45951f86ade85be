//! Discovery endpoint
//!
//! Serves the service descriptor at `GET /.well-known/socket-agent`. The
//! descriptor is generated on the first request and reused afterwards.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use socket_agent_core::{
    AuthSettings, DescriptorBuilder, DescriptorError, RouteTable, ServiceDescriptor, SizeLimits,
    DEFAULT_IDENTITY_SERVICE_URL,
};
use std::env;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::ApiResult;

/// Cache-Control value for the descriptor response
pub const DESCRIPTOR_CACHE_CONTROL: &str = "public, max-age=3600";

/// Service identity published in the descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub name: String,
    pub description: String,
    /// Public base URL (env: SOCKET_AGENT_BASE_URL). Derived from the first request when unset.
    pub base_url: Option<String>,
    /// Server ID for token discovery (env: SOCKET_AGENT_SERVER_ID)
    pub auth_server_id: Option<String>,
    /// Identity service URL (env: SOCKET_AGENT_IDENTITY_URL)
    pub identity_service_url: String,
    /// Token audience, "api" when unset
    pub audience: Option<String>,
}

impl DiscoveryConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            base_url: None,
            auth_server_id: None,
            identity_service_url: DEFAULT_IDENTITY_SERVICE_URL.to_string(),
            audience: None,
        }
    }

    /// Create config with overrides from environment variables
    pub fn from_env(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_vars(name, description, |key| env::var(key).ok())
    }

    pub fn from_vars<F>(name: impl Into<String>, description: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(name, description);
        config.base_url = lookup("SOCKET_AGENT_BASE_URL");
        config.auth_server_id = lookup("SOCKET_AGENT_SERVER_ID");
        if let Some(url) = lookup("SOCKET_AGENT_IDENTITY_URL") {
            config.identity_service_url = url;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_auth_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.auth_server_id = Some(server_id.into());
        self
    }

    pub fn with_identity_service_url(mut self, url: impl Into<String>) -> Self {
        self.identity_service_url = url.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Descriptor auth settings when no validator is attached
    pub fn auth_settings(&self) -> AuthSettings {
        let defaults = AuthSettings::default();
        AuthSettings {
            identity_service_url: self.identity_service_url.clone(),
            server_id: self.auth_server_id.clone(),
            audience: self.audience.clone().unwrap_or(defaults.audience),
            ..defaults
        }
    }
}

/// Shared state behind the discovery endpoint
#[derive(Debug)]
pub struct DiscoveryState {
    config: DiscoveryConfig,
    routes: RouteTable,
    auth: AuthSettings,
    limits: SizeLimits,
    descriptor: OnceCell<ServiceDescriptor>,
}

impl DiscoveryState {
    pub fn new(
        config: DiscoveryConfig,
        routes: RouteTable,
        auth: AuthSettings,
        limits: SizeLimits,
    ) -> Self {
        Self {
            config,
            routes,
            auth,
            limits,
            descriptor: OnceCell::new(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The memoized descriptor, generating it on first use.
    /// `request_base_url` is only used when no base URL is configured.
    /// A failed build is retried on the next call.
    pub async fn descriptor(
        &self,
        request_base_url: &str,
    ) -> Result<&ServiceDescriptor, DescriptorError> {
        self.descriptor
            .get_or_try_init(|| async move {
                let base_url = self
                    .config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| request_base_url.to_string());

                let descriptor = DescriptorBuilder::new(
                    self.config.name.clone(),
                    self.config.description.clone(),
                    base_url,
                )
                .auth_settings(self.auth.clone())
                .limits(self.limits)
                .build(&self.routes)?;

                tracing::info!(
                    service = %descriptor.name,
                    base_url = %descriptor.base_url,
                    endpoints = descriptor.endpoints.len(),
                    auth = descriptor.auth.auth_type.as_str(),
                    "Service descriptor generated"
                );
                Ok::<_, DescriptorError>(descriptor)
            })
            .await
    }
}

/// `{scheme}://{host}` of the incoming request
pub fn request_base_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}://{}", scheme, host)
}

/// Handler: GET /.well-known/socket-agent
pub async fn serve_descriptor(
    State(state): State<Arc<DiscoveryState>>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Response> {
    let descriptor = state.descriptor(&request_base_url(&headers, &uri)).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, DESCRIPTOR_CACHE_CONTROL),
            (header::VARY, "Host"),
        ],
        Json(descriptor),
    )
        .into_response())
}
