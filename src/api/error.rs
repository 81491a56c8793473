//! Unified API error handling.
//!
//! Every handler returns `Result<_, ApiError>`; errors serialize to the
//! `{ "error": "..." }` body the front end expects, with the status code
//! chosen by the constructor. Upstream failures re-emit the backend's
//! status; transport and configuration problems are a generic 500 with
//! details only in the server log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::ords::OrdsError;

/// Generic message for connectivity failures; the real cause is logged.
pub const GENERIC_UPSTREAM_ERROR: &str = "Error al conectar con el servidor";

/// The error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Bad request (400) - invalid client input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Unauthorized (401) - missing or invalid session
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Not found (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Internal error (500) - config or upstream plumbing failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Re-emit a backend failure with the backend's own status code.
    /// Non-error statuses collapse to 500.
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        let status = if status.is_client_error() || status.is_server_error() {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<OrdsError> for ApiError {
    fn from(err: OrdsError) -> Self {
        match err {
            OrdsError::NotConfigured => {
                tracing::error!("Backend base URL missing from configuration");
                ApiError::internal("DB_API_URL no está configurada")
            }
            OrdsError::Transport(e) => {
                tracing::error!("Backend transport error: {}", e);
                ApiError::internal(GENERIC_UPSTREAM_ERROR)
            }
            OrdsError::Backend(message) => ApiError::bad_request(message),
            OrdsError::UnsupportedEndpoint => ApiError::internal(
                "El endpoint DELETE no está disponible en el servidor. \
                 Por favor, ejecuta el script SQL actualizado.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_keeps_error_status() {
        let err = ApiError::upstream(StatusCode::CONFLICT, "duplicado");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "duplicado");
    }

    #[test]
    fn test_upstream_collapses_non_error_status() {
        let err = ApiError::upstream(StatusCode::SEE_OTHER, "redirigido");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backend_failure_maps_to_400_with_message() {
        let err = ApiError::from(OrdsError::Backend("ORA-00001".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "ORA-00001");
    }

    #[test]
    fn test_unsupported_endpoint_is_500() {
        let err = ApiError::from(OrdsError::UnsupportedEndpoint);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("DELETE"));
    }

    #[test]
    fn test_not_configured_names_the_variable() {
        let err = ApiError::from(OrdsError::NotConfigured);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("DB_API_URL"));
    }
}
