use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::plugin::PluginError;

/// Application error returned by HTTP handlers
///
/// Rendered as `{"detail": "..."}` with a status derived from the error kind.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Request body is not a valid command envelope
    #[error("Invalid command envelope: {0}")]
    InvalidCommand(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Plugin(err) => match err {
                PluginError::NotFound(_) => StatusCode::NOT_FOUND,
                PluginError::NotInitialized(_) => StatusCode::BAD_REQUEST,
                PluginError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                PluginError::InitializationFailed(_)
                | PluginError::ShutdownFailed(_)
                | PluginError::Configuration(_)
                | PluginError::Panic(_)
                | PluginError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidCommand(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Message placed in the `detail` field
    pub fn detail(&self) -> String {
        match self {
            AppError::Plugin(err @ (PluginError::Panic(_) | PluginError::Internal(_))) => {
                format!("Error executing command: {err}")
            }
            AppError::Plugin(err) => err.to_string(),
            AppError::InvalidCommand(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), detail = %detail, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), detail = %detail, "Request rejected");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
