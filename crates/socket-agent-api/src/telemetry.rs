//! Tracing configuration
//!
//! Console logging with an `EnvFilter`. `RUST_LOG` overrides the default
//! directives.

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,socket_agent=debug";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directives used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Include the event target in each line
    pub with_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            with_target: true,
        }
    }
}

impl TracingConfig {
    /// Config with a fixed default level, e.g. from a `-v` count
    pub fn with_level(level: &str) -> Self {
        Self {
            default_filter: format!("{},socket_agent={}", level, level),
            ..Default::default()
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &TracingConfig) -> bool {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
