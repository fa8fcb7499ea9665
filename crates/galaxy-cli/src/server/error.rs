//! Maps cache and forge failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use galaxy_core::GalaxyError;
use galaxy_forge::error::ForgeError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A client error reported by the forge, passed through with its status.
    #[error("upstream error: {message}")]
    Upstream { status: StatusCode, message: String },

    /// The artifact could not be built from what the forge returned.
    #[error("failed dependency: {0}")]
    FailedDependency(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classifies a failure to list the tags of a collection.
    pub fn from_listing(err: GalaxyError) -> Self {
        error!("listing failed: {err}");
        let message = err.to_string();

        match err {
            GalaxyError::InvalidKey { .. } => Self::BadRequest(message),
            GalaxyError::Forge(ForgeError::NotFound { .. }) => Self::NotFound(message),
            GalaxyError::Forge(ForgeError::Upstream { status, .. }) if status < 500 => {
                match StatusCode::from_u16(status) {
                    Ok(StatusCode::NOT_FOUND) => Self::NotFound(message),
                    Ok(status) => Self::Upstream { status, message },
                    Err(_) => Self::Internal(message),
                }
            }
            _ => Self::Internal(message),
        }
    }

    /// Classifies a failure to produce an artifact.
    pub fn from_build(err: GalaxyError) -> Self {
        error!("build failed: {err}");
        let message = err.to_string();

        match err {
            GalaxyError::InvalidKey { .. } => Self::BadRequest(message),
            err if err.is_upstream() => Self::FailedDependency(message),
            _ => Self::Internal(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => *status,
            Self::FailedDependency(_) => StatusCode::FAILED_DEPENDENCY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
