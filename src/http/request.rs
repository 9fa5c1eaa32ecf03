//! Request identification and tracing layers.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client did not send one
//! - Echo it on the response and forward it upstream
//! - Open one tracing span per request carrying the ID
//!
//! # Design Decisions
//! - Request ID added as early as possible, before authentication, so
//!   rejected requests are traceable too

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Correlation header shared with upstreams.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Wrap `router` with request-ID and trace layers.
pub fn apply(router: Router) -> Router {
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                path = %req.uri().path(),
                request_id = %request_id(req.headers()),
            )
        }));

    router.layer(layers)
}
