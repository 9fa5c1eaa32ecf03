//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated Request (method, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix + method)
//!     → Return: matched Route or no match (404)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse upstream base URLs and methods
//!     → Sort by prefix length
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{Route, Router, Upstream};
