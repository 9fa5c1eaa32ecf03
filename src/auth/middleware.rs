//! Bearer authentication middleware.
//! Every request must carry a token that verifies against the configured secret and issuer.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::auth::bearer::bearer_token;
use crate::auth::token::TokenVerifier;
use crate::http::response::GatewayError;
use crate::observability::metrics;

/// Verify the bearer token and attach the resulting `VerifiedIdentity`
/// to the request extensions.
pub async fn authenticate(
    State(verifier): State<Arc<TokenVerifier>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    let verified = match bearer_token(req.headers()) {
        Some(token) => verifier.verify(token),
        None => {
            tracing::debug!(path = %req.uri().path(), "Request without bearer token");
            metrics::record_auth_failure("missing");
            return Err(GatewayError::MissingToken);
        }
    };

    let identity = verified.map_err(|e| {
        tracing::warn!(
            path = %req.uri().path(),
            reason = e.reason(),
            error = %e,
            "Token verification failed"
        );
        metrics::record_auth_failure(e.reason());
        GatewayError::InvalidToken
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
