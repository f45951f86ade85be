//! # socket-agent core
//!
//! Framework-independent pieces of socket-agent:
//!
//! - [`ServiceDescriptor`] and its parts, the JSON document served at
//!   `/.well-known/socket-agent`
//! - [`RouteTable`], the side table where routes register their metadata
//! - [`DescriptorBuilder`], which walks a route table and enforces the
//!   3KB soft / 8KB hard size ceilings
//!
//! ```
//! use socket_agent_core::{AuthRequirement, DescriptorBuilder, RouteMeta, RouteTable};
//!
//! let mut table = RouteTable::new();
//! let key = table.register("/todos", "POST");
//! table.describe(key.clone(), RouteMeta::new("Create a todo"));
//! table.require_auth(key, AuthRequirement::new(["todos:write"]));
//!
//! let descriptor = DescriptorBuilder::new("Todo API", "Todos", "http://localhost:8000")
//!     .build(&table)
//!     .unwrap();
//! assert!(descriptor.auth.is_bearer());
//! ```

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod metadata;

pub use builder::{
    is_well_known, AuthSettings, DescriptorBuilder, SizeLimits, SizeStatus, WELL_KNOWN_PREFIX,
};
pub use descriptor::{
    AuthInfo, AuthType, EndpointInfo, SchemaPair, ServiceDescriptor, TokenValidation, UiHints,
    DEFAULT_CACHE_TTL_SECS, DEFAULT_IDENTITY_SERVICE_URL, DEFAULT_VALIDATE_ENDPOINT, SPEC_VERSION,
};
pub use error::DescriptorError;
pub use metadata::{AuthRequirement, RouteKey, RouteMeta, RouteTable};

/// Path at which the descriptor is served
pub const WELL_KNOWN_PATH: &str = "/.well-known/socket-agent";
