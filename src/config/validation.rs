//! Configuration validation.
//!
//! Semantic checks run after the environment and route file are parsed.
//! All errors are collected, not just the first.

use std::collections::HashSet;
use std::fmt;

use axum::http::Method;
use url::Url;

use crate::config::schema::{GatewayConfig, RouteConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptySecret,
    EmptyIssuer,
    ZeroTimeout(&'static str),
    NoRoutes,
    EmptyRouteName,
    InvalidPrefix { route: String, prefix: String },
    DuplicatePrefix(String),
    InvalidUpstream { route: String, reason: String },
    InvalidMethod { route: String, method: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "JWT secret must not be empty"),
            Self::EmptyIssuer => write!(f, "JWT issuer must not be empty"),
            Self::ZeroTimeout(name) => write!(f, "{} must be greater than zero", name),
            Self::NoRoutes => write!(f, "route table is empty"),
            Self::EmptyRouteName => write!(f, "route name must not be empty"),
            Self::InvalidPrefix { route, prefix } => {
                write!(f, "route '{}': path prefix '{}' must start with '/'", route, prefix)
            }
            Self::DuplicatePrefix(prefix) => write!(f, "duplicate path prefix '{}'", prefix),
            Self::InvalidUpstream { route, reason } => {
                write!(f, "route '{}': invalid upstream ({})", route, reason)
            }
            Self::InvalidMethod { route, method } => {
                write!(f, "route '{}': invalid method '{}'", route, method)
            }
        }
    }
}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.auth.issuer.is_empty() {
        errors.push(ValidationError::EmptyIssuer);
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("UPSTREAM_CONNECT_TIMEOUT_SECS"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("UPSTREAM_TIMEOUT_SECS"));
    }

    errors.extend(validate_routes(&config.routes));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_routes(routes: &[RouteConfig]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen = HashSet::new();
    for route in routes {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName);
        }

        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        } else if !seen.insert(normalize_prefix(&route.path_prefix)) {
            errors.push(ValidationError::DuplicatePrefix(route.path_prefix.clone()));
        }

        if let Err(reason) = check_upstream(&route.upstream) {
            errors.push(ValidationError::InvalidUpstream {
                route: route.name.clone(),
                reason,
            });
        }

        for method in &route.methods {
            if method.parse::<Method>().is_err() {
                errors.push(ValidationError::InvalidMethod {
                    route: route.name.clone(),
                    method: method.clone(),
                });
            }
        }
    }
    errors
}

/// Prefixes match case-insensitively, so `/Users` duplicates `/users/`.
fn normalize_prefix(prefix: &str) -> String {
    match prefix.trim_end_matches('/') {
        "" => "/".to_string(),
        p => p.to_ascii_lowercase(),
    }
}

fn check_upstream(upstream: &str) -> Result<(), String> {
    let url = Url::parse(upstream).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}
