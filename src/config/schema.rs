//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! Route types derive Serde traits for deserialization from the route file.

use serde::{Deserialize, Serialize};

/// Default upstream for the `users` route.
pub const DEFAULT_USER_MANAGEMENT_API: &str = "http://usermanagement:8080";

/// Root configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Route definitions mapping path prefixes to upstreams.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Build a config with default listener, timeouts and the single `users` route.
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            listener: ListenerConfig::default(),
            auth,
            routes: vec![RouteConfig::users(DEFAULT_USER_MANAGEMENT_API)],
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Port bound on all interfaces.
    pub port: u16,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { port: 80 }
    }
}

/// Shared-secret JWT settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to verify signatures.
    pub secret: String,

    /// Expected `iss` claim.
    pub issuer: String,

    /// Clock skew tolerated on `exp`/`nbf`, in seconds.
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            leeway_secs: 0,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

/// Route file root (`[[routes]]` tables).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteFile {
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Route configuration mapping a path prefix to one upstream service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match, on a segment boundary.
    pub path_prefix: String,

    /// Upstream base URL (e.g., "http://usermanagement:8080").
    pub upstream: String,

    /// Allowed methods. Empty means any method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Remove the prefix before forwarding (mount semantics).
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: bool,
}

fn default_strip_prefix() -> bool {
    true
}

impl RouteConfig {
    /// The gateway's built-in route: GET-only `/users` to user management.
    pub fn users(upstream: impl Into<String>) -> Self {
        Self {
            name: "users".to_string(),
            path_prefix: "/users".to_string(),
            upstream: upstream.into(),
            methods: vec!["GET".to_string()],
            strip_prefix: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the upstream to send response headers, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Prometheus listener address. Metrics export is off when unset.
    pub metrics_address: Option<String>,
}
