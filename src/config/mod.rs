//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (+ .env via dotenvy)
//!     → loader.rs (read variables, optional TOML route file)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to GatewayServer once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - Missing JWT secret or issuer is fatal
//! - Validation separates parsing from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    AuthConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, RouteConfig,
    TimeoutConfig,
};
