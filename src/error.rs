//! Error types for the proxy server.

use crate::port::Port;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Errors raised while creating, starting or running the proxy server.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid port: {0} (expected an integer between 0 and 65535)")]
    InvalidPort(Port),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Upstream error: {0}")]
    Upstream(#[from] crate::sse::SseError),

    #[error("Upstream request failed: {0}")]
    Forward(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
            code: &'static str,
        }

        let (status, code) = match &self {
            ProxyError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ProxyError::Forward(_) => (StatusCode::BAD_GATEWAY, "FORWARD_ERROR"),
            ProxyError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ProxyError::Config(_)
            | ProxyError::InvalidPort(_)
            | ProxyError::Bind { .. }
            | ProxyError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorBody {
            error: self.to_string(),
            code,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
