//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → connector (connect timeout)
//!     → timeouts.rs (deadline for response headers)
//!     → On failure: 502/504 to the client, no retry
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - Single attempt per client request; retrying is the caller's decision

pub mod timeouts;
