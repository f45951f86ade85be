//! Route registration side table
//!
//! Routes are recorded in registration order. Descriptive metadata and auth
//! requirements live in separate maps keyed by `(path, method)`, so handlers
//! themselves are never mutated.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Author-supplied description of a route
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteMeta {
    /// Brief description of what the endpoint does
    pub summary: String,
    /// JSON Schema fragment for the request body
    pub request_schema: Option<Value>,
    /// JSON Schema fragment for the response body
    pub response_schema: Option<Value>,
    /// Example calls (e.g. curl command lines)
    pub examples: Vec<String>,
}

impl RouteMeta {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn request_schema(mut self, schema: Value) -> Self {
        self.request_schema = Some(schema);
        self
    }

    pub fn response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn examples<I, E>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }
}

/// Declares that a route requires authentication.
///
/// Scopes are published in the descriptor but never checked against the
/// caller's grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequirement {
    pub scopes: Vec<String>,
}

impl AuthRequirement {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Key of a registered route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub path: String,
    pub method: String,
}

impl RouteKey {
    pub fn new(path: impl Into<String>, method: impl AsRef<str>) -> Self {
        Self {
            path: path.into(),
            method: method.as_ref().to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Ordered table of every registered route plus its side tables
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteKey>,
    meta: HashMap<RouteKey, RouteMeta>,
    auth: HashMap<RouteKey, AuthRequirement>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a route. Registering the same key twice keeps the first position.
    pub fn register(&mut self, path: impl Into<String>, method: impl AsRef<str>) -> RouteKey {
        let key = RouteKey::new(path, method);
        if !self.routes.contains(&key) {
            self.routes.push(key.clone());
        }
        key
    }

    /// Attach descriptive metadata to a route, registering it if needed
    pub fn describe(&mut self, key: RouteKey, meta: RouteMeta) {
        if !self.routes.contains(&key) {
            self.routes.push(key.clone());
        }
        self.meta.insert(key, meta);
    }

    /// Mark a route as requiring authentication, registering it if needed
    pub fn require_auth(&mut self, key: RouteKey, requirement: AuthRequirement) {
        if !self.routes.contains(&key) {
            self.routes.push(key.clone());
        }
        self.auth.insert(key, requirement);
    }

    /// Routes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RouteKey> {
        self.routes.iter()
    }

    pub fn meta(&self, key: &RouteKey) -> Option<&RouteMeta> {
        self.meta.get(key)
    }

    pub fn auth(&self, key: &RouteKey) -> Option<&AuthRequirement> {
        self.auth.get(key)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_normalizes_method() {
        let key = RouteKey::new("/items", "post");
        assert_eq!(key.method, "POST");
        assert_eq!(key.to_string(), "POST /items");
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut table = RouteTable::new();
        table.register("/b", "GET");
        table.register("/a", "POST");
        table.register("/b", "GET");

        let keys: Vec<String> = table.iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["GET /b", "POST /a"]);
    }

    #[test]
    fn test_side_tables() {
        let mut table = RouteTable::new();
        let key = table.register("/todos", "POST");
        table.describe(key.clone(), RouteMeta::new("Create a todo").example("curl -X POST /todos"));
        table.require_auth(key.clone(), AuthRequirement::new(["todos:write"]));

        assert_eq!(table.meta(&key).unwrap().summary, "Create a todo");
        assert_eq!(table.auth(&key).unwrap().scopes, vec!["todos:write"]);
        assert!(table.meta(&RouteKey::new("/todos", "GET")).is_none());
    }
}
