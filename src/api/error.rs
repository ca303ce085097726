use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned from handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid configuration: {}", join(.0))]
    ConfigurationInvalid(Vec<ConfigError>),

    #[error("Unauthorized")]
    Unauthorized,
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error body. `success` is always false so clients can branch on it.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ConfigurationInvalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::ConfigurationInvalid(_) => "ConfigurationInvalid",
            ApiError::Unauthorized => "Unauthorized",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.error_type();

        let (message, details) = match &self {
            ApiError::ConfigurationInvalid(errors) => {
                tracing::debug!(error = %self, "Rejected configuration");
                (
                    "Invalid configuration".to_string(),
                    errors.iter().map(ToString::to_string).collect(),
                )
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
                (self.to_string(), Vec::new())
            }
        };

        let body = ErrorResponse {
            success: false,
            error,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        ApiError::ConfigurationInvalid(vec![error])
    }
}

impl From<Vec<ConfigError>> for ApiError {
    fn from(errors: Vec<ConfigError>) -> Self {
        ApiError::ConfigurationInvalid(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
