use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::auth::{AuthError, AuthErrorKind};

/// RPC-level outcome codes, independent of the HTTP framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcCode {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    Unauthenticated,
    Internal,
}

impl RpcCode {
    pub fn status(self) -> StatusCode {
        match self {
            RpcCode::InvalidArgument => StatusCode::BAD_REQUEST,
            RpcCode::AlreadyExists => StatusCode::CONFLICT,
            RpcCode::NotFound => StatusCode::NOT_FOUND,
            RpcCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            RpcCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub code: RpcCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RpcCode::InvalidArgument, message)
    }

    /// No detail leaves the process for internal failures.
    pub fn internal() -> Self {
        Self::new(RpcCode::Internal, "internal error")
    }
}

impl From<AuthError> for RpcError {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            AuthErrorKind::UserExists => RpcError::new(RpcCode::AlreadyExists, "user already exists"),
            AuthErrorKind::UserNotFound => RpcError::new(RpcCode::NotFound, "user not found"),
            AuthErrorKind::InvalidCredentials => RpcError::new(RpcCode::Unauthenticated, "invalid email or password"),
            _ => {
                error!(error = %err, code = err.code(), "auth call failed");
                RpcError::internal()
            }
        }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        RpcError::invalid_argument(rejection.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
