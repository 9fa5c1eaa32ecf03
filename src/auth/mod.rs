//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → bearer.rs (extract token; none → 403)
//!     → token.rs (HMAC signature, issuer, exp/nbf; failure → 401)
//!     → identity.rs (user claim → VerifiedIdentity → x-user header)
//! ```
//!
//! `middleware.rs` wires the first two steps in front of every route; the
//! proxy performs the header injection on the outgoing request.

pub mod bearer;
pub mod identity;
pub mod middleware;
pub mod token;

pub use identity::{IdentityError, VerifiedIdentity, X_USER};
pub use middleware::authenticate;
pub use token::{TokenError, TokenVerifier};
