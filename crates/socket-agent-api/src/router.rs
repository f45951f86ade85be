//! Router construction
//!
//! [`SocketRouter`] wraps an axum router and records every route it is given
//! in a [`RouteTable`], so the discovery endpoint can describe them.
//!
//! ```rust,ignore
//! let app = SocketRouter::new(DiscoveryConfig::from_env("Todo API", "Todos"))
//!     .authenticate_with(validator)
//!     .route(Route::get("/todos", list_todos).describe(RouteMeta::new("List todos")))
//!     .route(
//!         Route::post("/todos", create_todo)
//!             .describe(RouteMeta::new("Create a todo"))
//!             .require_auth(["todos:write"]),
//!     )
//!     .into_router();
//! ```

use axum::{
    handler::Handler,
    http::Method,
    middleware,
    routing::{self, MethodRouter},
    Router,
};
use socket_agent_auth::TokenValidator;
use socket_agent_core::{
    AuthRequirement, AuthSettings, RouteMeta, RouteTable, SizeLimits, WELL_KNOWN_PATH,
};
use std::sync::Arc;

use crate::discovery::{serve_descriptor, DiscoveryConfig, DiscoveryState};
use crate::middleware::{
    auth_middleware, request_id_middleware, require_auth, tracing_middleware,
};

/// A single handler plus the metadata published for it
pub struct Route<S = ()> {
    path: String,
    method: Method,
    handler: MethodRouter<S>,
    meta: Option<RouteMeta>,
    auth: Option<AuthRequirement>,
}

impl<S> Route<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn new(path: impl Into<String>, method: Method, handler: MethodRouter<S>) -> Self {
        Self {
            path: path.into(),
            method,
            handler,
            meta: None,
            auth: None,
        }
    }

    pub fn get<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(path, Method::GET, routing::get(handler))
    }

    pub fn post<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(path, Method::POST, routing::post(handler))
    }

    pub fn put<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(path, Method::PUT, routing::put(handler))
    }

    pub fn patch<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(path, Method::PATCH, routing::patch(handler))
    }

    pub fn delete<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(path, Method::DELETE, routing::delete(handler))
    }

    /// Publish this route in the descriptor. Undescribed routes are served but not listed.
    pub fn describe(mut self, meta: RouteMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Answer 401 unless the request carries a valid bearer token.
    /// Scopes are advertised only.
    pub fn require_auth<I, Sc>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = Sc>,
        Sc: Into<String>,
    {
        self.auth = Some(AuthRequirement::new(scopes));
        self
    }

    /// [`require_auth`](Self::require_auth) with no scopes
    pub fn authenticated(mut self) -> Self {
        self.auth = Some(AuthRequirement::default());
        self
    }
}

/// Builds an axum [`Router`] that serves `/.well-known/socket-agent`
pub struct SocketRouter<S = ()> {
    config: DiscoveryConfig,
    table: RouteTable,
    routes: Vec<(String, MethodRouter<S>)>,
    validator: Option<Arc<TokenValidator>>,
    limits: SizeLimits,
}

impl<S> SocketRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            table: RouteTable::new(),
            routes: Vec::new(),
            validator: None,
            limits: SizeLimits::default(),
        }
    }

    /// Add a route. Handlers for different methods on one path are merged.
    ///
    /// # Panics
    ///
    /// Panics if the same method is added twice for a path, like [`Router::route`].
    pub fn route(mut self, route: Route<S>) -> Self {
        let Route {
            path,
            method,
            mut handler,
            meta,
            auth,
        } = route;

        let key = self.table.register(path.clone(), method.as_str());
        if let Some(meta) = meta {
            self.table.describe(key.clone(), meta);
        }
        if let Some(requirement) = auth {
            tracing::debug!(route = %key, scopes = ?requirement.scopes, "Route requires auth");
            self.table.require_auth(key, requirement);
            handler = handler.route_layer(middleware::from_fn(require_auth));
        }

        let handler = match self.routes.iter().position(|(p, _)| *p == path) {
            Some(i) => self.routes.remove(i).1.merge(handler),
            None => handler,
        };
        self.routes.push((path, handler));
        self
    }

    /// Validate bearer tokens on every request with `validator`
    pub fn authenticate_with(mut self, validator: Arc<TokenValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Override the descriptor size limits
    pub fn limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.table
    }

    fn auth_settings(&self) -> AuthSettings {
        let mut settings = self.config.auth_settings();

        if let Some(validator) = &self.validator {
            let config = validator.config();
            settings.identity_service_url = config.identity_service_url.clone();
            if settings.server_id.is_none() {
                settings.server_id = config.server_id.clone();
            }
            if let (None, Some(audience)) = (&self.config.audience, &config.audience) {
                settings.audience = audience.clone();
            }
            settings.token_validation = Some(config.token_validation());
        }

        settings
    }

    /// Finish building. The descriptor itself is generated on the first discovery request.
    pub fn into_router(self) -> Router<S> {
        let auth = self.auth_settings();
        tracing::debug!(
            service = %self.config.name,
            routes = self.table.len(),
            auth = self.validator.is_some(),
            "Building socket-agent router"
        );

        let state = Arc::new(DiscoveryState::new(
            self.config,
            self.table,
            auth,
            self.limits,
        ));

        let mut router =
            Router::new().route(WELL_KNOWN_PATH, routing::get(serve_descriptor).with_state(state));
        for (path, handler) in self.routes {
            router = router.route(&path, handler);
        }

        // Request order: request id, auth, tracing, handler
        router = router.layer(middleware::from_fn(tracing_middleware));
        if let Some(validator) = self.validator {
            router = router.layer(middleware::from_fn_with_state(validator, auth_middleware));
        }
        router.layer(middleware::from_fn(request_id_middleware))
    }
}
