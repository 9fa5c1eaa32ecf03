//! `Authorization` header parsing.

use axum::http::{header, HeaderMap};

/// Extract the bearer token from the request headers.
///
/// The token is the second whitespace-separated field of the first
/// `Authorization` value. The scheme word is not checked; anything without a
/// second field (or not valid visible ASCII) counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1))
}
