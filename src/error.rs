//! Error types for Inkpost
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! Form validation problems are usually reported as flash messages by the
//! handlers instead; see `web::flash`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404). Carries the page text.
    #[error("{0}")]
    NotFound(&'static str),

    /// Login required (redirects to /login)
    #[error("Authentication required")]
    Unauthorized,

    /// Not allowed to touch this resource (403)
    #[error("Access denied")]
    Forbidden,

    /// Invalid user input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure (500)
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Session token signing failure (500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Label used for the `errors_total` metric
    fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::Validation(_) => "validation",
            AppError::Database(_) => "database",
            AppError::PasswordHash(_) => "password_hash",
            AppError::Encryption(_) => "encryption",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Anonymous visitors hitting a login-only route are redirected to the
    /// login page; everything else becomes a plain-text status response.
    /// Server-side failures are logged and answered with a generic message.
    fn into_response(self) -> Response {
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.kind()]).inc();

        match self {
            AppError::Unauthorized => Redirect::to("/login").into_response(),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::Database(_)
            | AppError::PasswordHash(_)
            | AppError::Encryption(_)
            | AppError::Config(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
