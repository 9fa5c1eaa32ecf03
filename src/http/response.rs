//! Gateway-originated responses.
//!
//! # Responsibilities
//! - Map gateway failures to HTTP status codes
//! - Render them as `{ "message": ... }` JSON bodies
//!
//! Upstream responses never pass through here; they are relayed as-is.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::IdentityError;

/// JSON body of every gateway-originated error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: &'static str,
}

/// Per-request failures produced by the gateway itself.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no bearer token provided")]
    MissingToken,

    #[error("bearer token rejected")]
    InvalidToken,

    #[error("no route for request")]
    RouteNotFound,

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("failed to build upstream request: {0}")]
    Request(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::FORBIDDEN,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Identity(_) | Self::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Never includes error details.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Token não fornecido!",
            Self::InvalidToken => "Token inválido!",
            Self::RouteNotFound => "Rota não encontrada!",
            Self::UpstreamTimeout(_) => "Tempo de resposta do serviço esgotado!",
            Self::Upstream(_) => "Serviço indisponível!",
            Self::Identity(_) | Self::Request(_) => "Erro interno do gateway!",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
