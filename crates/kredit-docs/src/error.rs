use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::credit::{CategoryError, CreditServiceError, RepositoryError, TemplateError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Json(serde_json::Error),
    Credit(CreditServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Json(err) => write!(f, "invalid record JSON: {}", err),
            AppError::Credit(err) => write!(f, "credit document error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Credit(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Credit(err) => match err {
                CreditServiceError::Repository(RepositoryError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                CreditServiceError::Category(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CreditServiceError::Template(TemplateError::NotFound { .. }) => {
                    StatusCode::NOT_FOUND
                }
                CreditServiceError::Template(TemplateError::UnsupportedExtension { .. }) => {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE
                }
                CreditServiceError::Repository(RepositoryError::Unavailable(_))
                | CreditServiceError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Credit(err) => err.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<CreditServiceError> for AppError {
    fn from(value: CreditServiceError) -> Self {
        Self::Credit(value)
    }
}

impl From<CategoryError> for AppError {
    fn from(value: CategoryError) -> Self {
        Self::Credit(CreditServiceError::Category(value))
    }
}
