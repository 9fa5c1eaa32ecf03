//! Timeout enforcement for upstream calls.
//!
//! Connect time is bounded on the connector; this module bounds the time
//! until the upstream sends response headers. Expiry maps to 504.

use std::future::Future;
use std::time::Duration;

use crate::http::response::GatewayError;

/// Await `fut`, failing with `UpstreamTimeout` once `limit` elapses.
///
/// Dropping the inner future on expiry also drops its upstream connection.
pub async fn with_deadline<F, T, E>(limit: Duration, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, E>>,
    GatewayError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(GatewayError::from),
        Err(_) => Err(GatewayError::UpstreamTimeout(limit)),
    }
}
