//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use feedback_gateway::config::{AuthConfig, GatewayConfig, RouteConfig};
use feedback_gateway::{GatewayServer, Shutdown};

pub const SECRET: &str = "S1";
pub const ISSUER: &str = "I1";

/// Serve `app` as an upstream on an ephemeral port.
pub async fn start_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start an upstream that echoes what it received as JSON.
pub async fn start_echo_upstream() -> SocketAddr {
    start_upstream(Router::new().fallback(echo)).await
}

async fn echo(req: Request<Body>) -> Json<Value> {
    let (parts, body) = req.into_parts();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let user = header("x-user")
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .unwrap_or(Value::Null);
    let body = axum::body::to_bytes(body, 1024 * 1024).await.unwrap();

    Json(json!({
        "message": "Usuário encontrado!",
        "user": user,
        "x_user_values": parts.headers.get_all("x-user").iter().count(),
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "host": header("host"),
        "request_id": header("x-request-id"),
        "authorization": header("authorization"),
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Start an upstream whose status and body come from `f`.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    let app = Router::new().fallback(move || {
        let f = f.clone();
        async move {
            let (status, body) = f().await;
            (StatusCode::from_u16(status).unwrap(), body).into_response()
        }
    });
    start_upstream(app).await
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config with the default `users` route pointing at `upstream`.
pub fn config(secret: &str, issuer: &str, upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::new(AuthConfig::new(secret, issuer));
    config.routes = vec![RouteConfig::users(format!("http://{}", upstream))];
    config
}

/// Start a gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

/// Sign `claims` with HS256.
pub fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn user_token(user: Value) -> String {
    sign(json!({ "user": user, "iss": ISSUER }), SECRET)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
