//! HTTP error type and the mappings from [`CoreError`] and body rejections.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nextpaste_core::{ClipboardError, CoreError, ServerError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Well-formed JSON that does not fit the expected shape.
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Conflict with the current server state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Service unavailable (port in use, no clipboard tool).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::UnprocessableEntity(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => msg,
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{message}");
        }

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Server(server_err) => server_err.into(),
            CoreError::Clipboard(clip_err) => clip_err.into(),
            CoreError::Settings(settings_err) => Self::BadRequest(settings_err.to_string()),
            CoreError::Validation(msg) => Self::BadRequest(msg),
            CoreError::Configuration(msg) => Self::Internal(format!("Config: {msg}")),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => Self::UnprocessableEntity(message),
            _ => Self::BadRequest(message),
        }
    }
}

impl From<ServerError> for HttpError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::AlreadyRunning(_) | ServerError::NotRunning => {
                Self::Conflict(err.to_string())
            }
            ServerError::BindFailed { .. } => Self::ServiceUnavailable(err.to_string()),
            ServerError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<ClipboardError> for HttpError {
    fn from(err: ClipboardError) -> Self {
        match err {
            ClipboardError::Unavailable(_) | ClipboardError::Unsupported { .. } => {
                Self::ServiceUnavailable(err.to_string())
            }
            ClipboardError::AlreadyWatching => Self::Conflict(err.to_string()),
            ClipboardError::Read(_) | ClipboardError::Write(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextpaste_core::SettingsError;

    #[test]
    fn test_core_error_mapping() {
        let addr = "127.0.0.1:8080".parse().unwrap();
        let cases = [
            (
                CoreError::Server(ServerError::AlreadyRunning(addr)),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::Server(ServerError::BindFailed {
                    address: "0.0.0.0:80".into(),
                    reason: "denied".into(),
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::Settings(SettingsError::InvalidMaxLogs(0)),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Clipboard(ClipboardError::Unavailable("no xclip".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::Configuration("bad dir".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_unprocessable_entity_status() {
        let err = HttpError::UnprocessableEntity("missing field `port`".into());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_response_status_matches_body() {
        let response = HttpError::NotFound("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
