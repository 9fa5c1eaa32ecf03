//! Feedback API Gateway Library
//!
//! Authenticates every request with a shared-secret JWT, injects the
//! verified `user` claim as an `x-user` header, and reverse-proxies the
//! call to the backend service that owns the path prefix.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
