//! Request forwarding to upstream services.
//!
//! # Responsibilities
//! - Look up the route for an authenticated request
//! - Rewrite URI and `Host` onto the upstream
//! - Inject the verified identity as `x-user`
//! - Relay the upstream response unmodified (minus hop-by-hop headers)
//!
//! # Design Decisions
//! - Bodies are streamed both ways, never buffered
//! - Single attempt; connect and response-header deadlines apply
//! - A client disconnect drops this future and with it the upstream request

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::auth::VerifiedIdentity;
use crate::http::request::request_id;
use crate::http::response::GatewayError;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::routing::{Route, Router as ProxyRouter};

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub client: Client<HttpConnector, Body>,
    pub upstream_timeout: Duration,
}

/// Connection-scoped headers that must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Fallback handler: every authenticated request lands here.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let Some(route) = state.router.match_request(&request) else {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %request.uri().path(),
            "No route matched"
        );
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return GatewayError::RouteNotFound.into_response();
    };

    match forward(&state, route, request).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                route = %route.name,
                status = %response.status(),
                "Upstream responded"
            );
            metrics::record_request(
                method.as_str(),
                response.status().as_u16(),
                &route.name,
                start_time,
            );
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %route.name,
                error = %e,
                "Upstream request failed"
            );
            metrics::record_request(method.as_str(), e.status().as_u16(), &route.name, start_time);
            e.into_response()
        }
    }
}

/// Build the upstream request, send it, and convert the response.
async fn forward(
    state: &AppState,
    route: &Route,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let (mut parts, body) = request.into_parts();

    // Only reachable behind `authenticate`; refuse rather than forward anonymously.
    let identity = parts
        .extensions
        .remove::<VerifiedIdentity>()
        .ok_or(GatewayError::MissingToken)?;

    let uri = route
        .target_uri(&parts.uri)
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    strip_hop_by_hop(&mut parts.headers);
    let host = HeaderValue::from_str(route.upstream().authority().as_str())
        .map_err(|e| GatewayError::Request(e.to_string()))?;
    parts.headers.insert(header::HOST, host);
    identity.inject(&mut parts.headers)?;

    tracing::debug!(
        route = %route.name,
        method = %parts.method,
        upstream = %uri,
        "Forwarding request"
    );

    let mut upstream_req = Request::new(body);
    *upstream_req.method_mut() = parts.method;
    *upstream_req.uri_mut() = uri;
    *upstream_req.headers_mut() = parts.headers;

    let response: Response<Incoming> =
        with_deadline(state.upstream_timeout, state.client.request(upstream_req)).await?;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}
