//! Configuration loading from the environment and the optional route file.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{
    AuthConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, RouteConfig,
    RouteFile, TimeoutConfig, DEFAULT_USER_MANAGEMENT_API,
};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {key} ({reason})")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read route file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse route file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// `routes_file` takes precedence over `GATEWAY_ROUTES_FILE`.
    pub fn from_env(routes_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), routes_file)
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F, routes_file: Option<&Path>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as missing, like an unset variable.
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let secret = required("JWT_SECRET_KEY")?;
        let issuer = required("JWT_ISSUER")?;

        let auth = AuthConfig {
            secret,
            issuer,
            leeway_secs: parse_or(&lookup, "JWT_LEEWAY_SECS", 0)?,
        };

        let listener = ListenerConfig {
            port: parse_or(&lookup, "PORT", ListenerConfig::default().port)?,
        };

        let defaults = TimeoutConfig::default();
        let timeouts = TimeoutConfig {
            connect_secs: parse_or(&lookup, "UPSTREAM_CONNECT_TIMEOUT_SECS", defaults.connect_secs)?,
            upstream_secs: parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", defaults.upstream_secs)?,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Pretty,
            Some(v) if v.is_empty() || v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    reason: format!("expected 'pretty' or 'json', got '{}'", v),
                })
            }
        };
        let observability = ObservabilityConfig {
            log_format,
            metrics_address: lookup("METRICS_ADDRESS").filter(|v| !v.is_empty()),
        };

        let routes_file = routes_file
            .map(Path::to_path_buf)
            .or_else(|| lookup("GATEWAY_ROUTES_FILE").filter(|v| !v.is_empty()).map(PathBuf::from));
        let routes = match routes_file {
            Some(path) => load_routes(&path)?,
            None => {
                let upstream = lookup("USER_MANAGEMENT_API")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_USER_MANAGEMENT_API.to_string());
                vec![RouteConfig::users(upstream)]
            }
        };

        let config = GatewayConfig {
            listener,
            auth,
            routes,
            timeouts,
            observability,
        };
        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

/// Load the route table from a TOML file.
pub fn load_routes(path: &Path) -> Result<Vec<RouteConfig>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RouteFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.routes)
}
