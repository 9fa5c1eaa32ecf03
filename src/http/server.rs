//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy fallback handler
//! - Wire up middleware (request ID, tracing, authentication)
//! - Build the upstream HTTP client with connect timeout
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;

use crate::auth::{authenticate, TokenVerifier};
use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig};
use crate::http::proxy::{proxy_handler, AppState};
use crate::http::request;
use crate::lifecycle::ShutdownSignal;
use crate::routing::Router as ProxyRouter;

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server. Fails on an invalid configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let proxy_router = Arc::new(ProxyRouter::from_config(&config.routes)?);
        let verifier = Arc::new(TokenVerifier::new(&config.auth));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            router: proxy_router,
            client,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let router = Self::build_router(state, verifier);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Authentication wraps the fallback, so unmatched paths are still
    /// authenticated before they get a 404.
    fn build_router(state: AppState, verifier: Arc<TokenVerifier>) -> Router {
        let router = Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(verifier, authenticate));

        request::apply(router)
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );
        for route in &self.config.routes {
            tracing::info!(
                route = %route.name,
                prefix = %route.path_prefix,
                upstream = %route.upstream,
                methods = ?route.methods,
                "Route registered"
            );
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
