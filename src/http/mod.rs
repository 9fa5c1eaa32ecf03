//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, trace span)
//!     → auth::authenticate (bearer token → VerifiedIdentity)
//!     → proxy.rs (route lookup, x-user injection, forward)
//!     → response.rs (gateway-originated errors as JSON)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::GatewayError;
pub use server::GatewayServer;
