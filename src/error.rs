use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network errors
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Upstream service answered with an error
    #[error("Integration error ({integration_source}): {message}")]
    Integration { integration_source: String, message: String },

    /// A field the relay depends on is missing from an upstream resource
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Test run parent is not a test suite
    #[error("Unsupported parent type: {0}")]
    UnsupportedParent(String),
}

impl AppError {
    /// Shorthand for an upstream failure attributed to `source`
    pub fn integration(source: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Integration {
            integration_source: source.into(),
            message: message.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Serialization(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Integration { .. } => StatusCode::BAD_GATEWAY,
            AppError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnsupportedParent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Integration { .. } => "INTEGRATION_ERROR",
            AppError::MissingField(_) => "MISSING_FIELD",
            AppError::UnsupportedParent(_) => "UNSUPPORTED_PARENT",
        }
    }

    /// Classify a reqwest transport failure the same way for every upstream
    pub(crate) fn from_transport(target: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!(
                "{} request timed out after {} seconds",
                target, timeout_secs
            ))
        } else if err.is_connect() {
            AppError::Network(format!("Failed to connect to {}: {}", target, err))
        } else if err.is_decode() {
            AppError::Serialization(format!("Failed to decode {} response: {}", target, err))
        } else {
            AppError::Network(format!("{} request failed: {}", target, err))
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = status.as_u16(),
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
