//! Service Descriptor
//!
//! The descriptor is a JSON document that summarizes an HTTP service's
//! endpoints, schemas and authentication requirements for machine consumers.
//! It's served at `/.well-known/socket-agent`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DescriptorError;

/// Descriptor format version
pub const SPEC_VERSION: &str = "2025-01-01";

/// Default identity service used for token validation
pub const DEFAULT_IDENTITY_SERVICE_URL: &str = "https://socketagent.io";

/// Default token validation endpoint on the identity service
pub const DEFAULT_VALIDATE_ENDPOINT: &str = "/v1/me";

/// Default token cache TTL in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// A single (path, method) pair exposed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// URL path of the endpoint, in the router's template syntax
    pub path: String,
    /// HTTP method (GET, POST, ...)
    pub method: String,
    /// Brief description of what the endpoint does
    pub summary: String,
    /// Whether the endpoint requires authentication
    #[serde(default)]
    pub auth_required: bool,
    /// Required scopes (advisory only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

/// Token validation settings advertised to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenValidation {
    /// Token cache TTL in seconds
    pub cache_ttl: u64,
    /// Endpoint used for token validation
    pub validate_endpoint: String,
}

impl Default for TokenValidation {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            validate_endpoint: DEFAULT_VALIDATE_ENDPOINT.to_string(),
        }
    }
}

/// Authentication scheme declared by the descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    None,
    Bearer,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "none",
            AuthType::Bearer => "bearer",
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Authentication type
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    /// Additional auth details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identity service URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_service_url: Option<String>,
    /// Server ID used for token discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Token audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Required scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    /// Whether authentication is optional
    #[serde(default)]
    pub optional: bool,
    /// Token validation config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_validation: Option<TokenValidation>,
}

impl AuthInfo {
    /// Auth info for a service with no protected endpoints
    pub fn none() -> Self {
        Self {
            auth_type: AuthType::None,
            description: None,
            identity_service_url: None,
            server_id: None,
            audience: None,
            scopes: None,
            optional: false,
            token_validation: None,
        }
    }

    /// Bearer auth info pointing at an identity service
    pub fn bearer(identity_service_url: impl Into<String>) -> Self {
        Self {
            auth_type: AuthType::Bearer,
            identity_service_url: Some(identity_service_url.into()),
            ..Self::none()
        }
    }

    pub fn is_bearer(&self) -> bool {
        self.auth_type == AuthType::Bearer
    }
}

impl Default for AuthInfo {
    fn default() -> Self {
        Self::none()
    }
}

/// Optional UI generation hints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiHints {
    /// Form layout hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<serde_json::Value>,
}

/// Request/response schema fragments for one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl SchemaPair {
    pub fn is_empty(&self) -> bool {
        self.request.is_none() && self.response.is_none()
    }
}

/// Complete service descriptor
///
/// # Example
///
/// ```
/// use socket_agent_core::{EndpointInfo, ServiceDescriptor};
///
/// let mut descriptor = ServiceDescriptor::new("Todo API", "Simple todo list", "http://localhost:8000");
/// descriptor.endpoints.push(EndpointInfo {
///     path: "/todos".to_string(),
///     method: "GET".to_string(),
///     summary: "List todos".to_string(),
///     auth_required: false,
///     scopes: None,
/// });
/// assert!(descriptor.size_bytes().unwrap() < 3 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// API name
    pub name: String,
    /// API description
    pub description: String,
    /// Base URL of the API
    pub base_url: String,
    /// Available endpoints, in registration order
    pub endpoints: Vec<EndpointInfo>,
    /// Request/response schemas keyed by path
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaPair>,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthInfo,
    /// Example API calls
    #[serde(default)]
    pub examples: Vec<String>,
    /// Optional UI generation hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<BTreeMap<String, UiHints>>,
    /// Descriptor format version
    #[serde(rename = "specVersion", default = "default_spec_version")]
    pub spec_version: String,
}

fn default_spec_version() -> String {
    SPEC_VERSION.to_string()
}

impl ServiceDescriptor {
    /// Create an empty descriptor
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            base_url: base_url.into(),
            endpoints: Vec::new(),
            schemas: BTreeMap::new(),
            auth: AuthInfo::none(),
            examples: Vec::new(),
            ui: None,
            spec_version: default_spec_version(),
        }
    }

    /// Canonical (whitespace-free) JSON encoding
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, DescriptorError> {
        serde_json::to_vec(self).map_err(|e| DescriptorError::Serialization(e.to_string()))
    }

    /// Size of the canonical encoding in bytes
    pub fn size_bytes(&self) -> Result<usize, DescriptorError> {
        Ok(self.to_canonical_json()?.len())
    }

    /// Size of the canonical encoding in KB
    pub fn size_kb(&self) -> Result<f64, DescriptorError> {
        Ok(self.size_bytes()? as f64 / 1024.0)
    }

    /// Endpoints that declare an auth requirement
    pub fn protected_endpoints(&self) -> impl Iterator<Item = &EndpointInfo> {
        self.endpoints.iter().filter(|e| e.auth_required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_new() {
        let descriptor = ServiceDescriptor::new("Test API", "desc", "http://localhost");
        assert_eq!(descriptor.spec_version, SPEC_VERSION);
        assert_eq!(descriptor.auth.auth_type, AuthType::None);
        assert!(descriptor.endpoints.is_empty());
    }

    #[test]
    fn test_none_fields_are_omitted() {
        let descriptor = ServiceDescriptor::new("Test API", "desc", "http://localhost");
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["auth"]["type"], "none");
        assert!(json["auth"].get("identity_service_url").is_none());
        assert!(json.get("ui").is_none());
        assert_eq!(json["specVersion"], "2025-01-01");
    }

    #[test]
    fn test_size_uses_compact_encoding() {
        let descriptor = ServiceDescriptor::new("A", "B", "C");
        let pretty = serde_json::to_vec_pretty(&descriptor).unwrap();
        let size = descriptor.size_bytes().unwrap();

        assert!(size < pretty.len());
        assert_eq!(size, serde_json::to_string(&descriptor).unwrap().len());
    }

    #[test]
    fn test_deserialize_served_descriptor() {
        let raw = r#"{
            "name": "Todo API",
            "description": "todos",
            "base_url": "http://localhost:8000",
            "endpoints": [{"path": "/todos", "method": "GET", "summary": "List"}],
            "auth": {"type": "bearer", "identity_service_url": "https://socketagent.io"},
            "specVersion": "2025-01-01"
        }"#;

        let descriptor: ServiceDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(descriptor.endpoints.len(), 1);
        assert!(!descriptor.endpoints[0].auth_required);
        assert!(descriptor.auth.is_bearer());
        assert!(descriptor.schemas.is_empty());
    }
}
