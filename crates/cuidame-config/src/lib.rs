//! # CuidaMe Config
//!
//! Configuration structures loaded from environment variables. Each type exposes
//! `from_env()` and is constructed once at startup, then injected through the
//! application state. Request-handling code never reads the environment.
//!
//! - [`jwt`]: signing secret and token lifetime
//! - [`cors`]: allowed origins
//! - [`server`]: bind address
//! - [`logging`]: log level, format and optional file output

pub mod cors;
pub mod jwt;
pub mod logging;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use logging::{LogConfig, LogFormat};
pub use server::ServerConfig;

/// Reads an environment variable, treating empty values as unset.
pub(crate) fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
