//! # socket-agent API
//!
//! Axum integration for socket-agent.
//!
//! Features:
//! - `GET /.well-known/socket-agent` built from the registered routes
//! - Bearer token middleware backed by a cached `TokenValidator`
//! - Per-route auth guards and `CurrentUser` / `MaybeUser` extractors
//! - Request ID and tracing middleware
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use socket_agent_api::{CurrentUser, DiscoveryConfig, Route, SocketRouter};
//! use socket_agent_auth::{AuthConfig, TokenValidator};
//! use socket_agent_core::RouteMeta;
//!
//! async fn list_todos() -> &'static str {
//!     "[]"
//! }
//!
//! async fn create_todo(CurrentUser(user): CurrentUser) -> String {
//!     format!("created by {}", user.username)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let validator = Arc::new(TokenValidator::new(AuthConfig::from_env()?)?);
//!
//!     let app = SocketRouter::new(DiscoveryConfig::from_env("Todo API", "Simple todo list"))
//!         .authenticate_with(validator)
//!         .route(Route::get("/todos", list_todos).describe(RouteMeta::new("List todos")))
//!         .route(
//!             Route::post("/todos", create_todo)
//!                 .describe(RouteMeta::new("Create a todo"))
//!                 .require_auth(["todos:write"]),
//!         )
//!         .into_router();
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod telemetry;

pub use discovery::{DiscoveryConfig, DiscoveryState};
pub use error::{ApiError, ApiResult};
pub use extract::{AuthContext, CurrentUser, MaybeUser};
pub use router::{Route, SocketRouter};
pub use telemetry::{init_tracing, TracingConfig};
