//! Descriptor construction from a route table

use crate::descriptor::{
    AuthInfo, EndpointInfo, SchemaPair, ServiceDescriptor, TokenValidation,
    DEFAULT_IDENTITY_SERVICE_URL,
};
use crate::error::DescriptorError;
use crate::metadata::RouteTable;

/// Path prefix excluded from descriptors
pub const WELL_KNOWN_PREFIX: &str = "/.well-known";

/// `/.well-known` itself or a path below it. `/.well-knownfoo` is not.
pub fn is_well_known(path: &str) -> bool {
    path.strip_prefix(WELL_KNOWN_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Size ceilings for the canonical encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    /// Above this a warning is logged (bytes)
    pub soft: usize,
    /// Above this construction fails (bytes)
    pub hard: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            soft: 3 * 1024,
            hard: 8 * 1024,
        }
    }
}

/// How a descriptor size compares to its limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStatus {
    Ok,
    OverSoft,
    OverHard,
}

impl SizeLimits {
    pub fn classify(&self, size: usize) -> SizeStatus {
        if size > self.hard {
            SizeStatus::OverHard
        } else if size > self.soft {
            SizeStatus::OverSoft
        } else {
            SizeStatus::Ok
        }
    }
}

/// Auth settings published when any endpoint requires authentication
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSettings {
    pub identity_service_url: String,
    pub server_id: Option<String>,
    pub audience: String,
    pub description: String,
    pub token_validation: Option<TokenValidation>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            identity_service_url: DEFAULT_IDENTITY_SERVICE_URL.to_string(),
            server_id: None,
            audience: "api".to_string(),
            description: "Bearer tokens validated by the identity service".to_string(),
            token_validation: None,
        }
    }
}

/// Builds a [`ServiceDescriptor`] from a [`RouteTable`].
///
/// # Example
///
/// ```
/// use socket_agent_core::{DescriptorBuilder, RouteMeta, RouteTable};
///
/// let mut table = RouteTable::new();
/// let key = table.register("/items", "POST");
/// table.describe(key, RouteMeta::new("Create an item"));
/// table.register("/health", "GET");
///
/// let descriptor = DescriptorBuilder::new("Item API", "Items", "http://localhost")
///     .build(&table)
///     .unwrap();
/// assert_eq!(descriptor.endpoints.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    description: String,
    base_url: String,
    auth: AuthSettings,
    limits: SizeLimits,
}

impl DescriptorBuilder {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            base_url: base_url.into(),
            auth: AuthSettings::default(),
            limits: SizeLimits::default(),
        }
    }

    pub fn auth_settings(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }

    pub fn limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Assemble the descriptor and enforce the size ceilings
    pub fn build(&self, table: &RouteTable) -> Result<ServiceDescriptor, DescriptorError> {
        let mut descriptor =
            ServiceDescriptor::new(&self.name, &self.description, &self.base_url);

        for key in table.iter() {
            if is_well_known(&key.path) {
                continue;
            }

            // Undescribed routes stay private
            let Some(meta) = table.meta(key) else {
                continue;
            };

            let requirement = table.auth(key);
            let scopes = requirement
                .map(|r| r.scopes.clone())
                .filter(|s| !s.is_empty());

            descriptor.endpoints.push(EndpointInfo {
                path: key.path.clone(),
                method: key.method.clone(),
                summary: meta.summary.clone(),
                auth_required: requirement.is_some(),
                scopes,
            });

            if meta.request_schema.is_some() || meta.response_schema.is_some() {
                let entry = descriptor
                    .schemas
                    .entry(key.path.clone())
                    .or_insert_with(SchemaPair::default);
                if let Some(schema) = &meta.request_schema {
                    entry.request = Some(schema.clone());
                }
                if let Some(schema) = &meta.response_schema {
                    entry.response = Some(schema.clone());
                }
            }

            descriptor.examples.extend(meta.examples.iter().cloned());
        }

        if descriptor.protected_endpoints().next().is_some() {
            descriptor.auth = AuthInfo {
                description: Some(self.auth.description.clone()),
                server_id: self.auth.server_id.clone(),
                audience: Some(self.auth.audience.clone()),
                optional: false,
                token_validation: self.auth.token_validation.clone(),
                ..AuthInfo::bearer(&self.auth.identity_service_url)
            };
        }

        let size = descriptor.size_bytes()?;
        match self.limits.classify(size) {
            SizeStatus::OverHard => {
                return Err(DescriptorError::TooLarge {
                    size,
                    limit: self.limits.hard,
                })
            }
            SizeStatus::OverSoft => {
                tracing::warn!(
                    size_bytes = size,
                    soft_limit = self.limits.soft,
                    "Descriptor size ({:.2}KB) exceeds recommended {}KB limit",
                    size as f64 / 1024.0,
                    self.limits.soft / 1024
                );
            }
            SizeStatus::Ok => {}
        }

        tracing::debug!(
            endpoints = descriptor.endpoints.len(),
            size_bytes = size,
            "Service descriptor built"
        );

        Ok(descriptor)
    }
}
