//! Error types for the RSVP API.
//!
//! Domain errors are raised in the validation and store layers and recovered
//! at the HTTP boundary: every variant maps to a status code plus the JSON
//! error shape `{"errors": ["…", …]}` expected by the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for domain and handler operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error taxonomy for the API.
///
/// Organized by category: user-correctable validation failures, generic
/// authentication/authorization failures, missing resources, and internal
/// faults that must never leak details to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════
    /// One or more field invariants were violated.
    ///
    /// Carries every violated rule so the client can show all of them at
    /// once, the way the signup form expects.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    // ═══════════════════════════════════════════════════════════
    // Authentication / Authorization
    // ═══════════════════════════════════════════════════════════
    /// Login failed.
    ///
    /// Deliberately generic: the message never reveals whether the email
    /// was unknown or the password wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The request needs a valid session and none was presented.
    #[error("Unauthorized")]
    Unauthorized,

    /// The authenticated user is not allowed to perform this operation.
    #[error("{0}")]
    Forbidden(String),

    // ═══════════════════════════════════════════════════════════
    // Resources
    // ═══════════════════════════════════════════════════════════
    /// Requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    // ═══════════════════════════════════════════════════════════
    // Sessions
    // ═══════════════════════════════════════════════════════════
    /// Session not found in the session store.
    #[error("Session not found")]
    SessionNotFound,

    /// Session exists but has passed its expiry.
    #[error("Session has expired")]
    SessionExpired,

    // ═══════════════════════════════════════════════════════════
    // System
    // ═══════════════════════════════════════════════════════════
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Email delivery failed.
    #[error("Failed to send email: {0}")]
    EmailDelivery(String),

    /// Internal fault (lock poisoning, serialization, ...).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build a validation error from a single message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Build a not-found error for a named resource.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} Not Found"))
    }

    /// Returns `true` if this error is due to invalid user input or a
    /// failed permission check, as opposed to an internal fault.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidCredentials
                | Self::Unauthorized
                | Self::Forbidden(_)
                | Self::NotFound(_)
                | Self::SessionNotFound
                | Self::SessionExpired
        )
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials
            | Self::Unauthorized
            | Self::SessionNotFound
            | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::EmailDelivery(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// User-facing messages for the JSON error body.
    ///
    /// Internal faults collapse to a generic message; session errors
    /// collapse to the generic unauthorized message.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::SessionNotFound | Self::SessionExpired => {
                vec![Self::Unauthorized.to_string()]
            }
            Self::Database(_) | Self::EmailDelivery(_) | Self::Internal(_) => {
                vec!["Internal Server Error".to_string()]
            }
            other => vec![other.to_string()],
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable error messages.
    errors: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal faults are logged with their real cause and returned
        // with a generic body only.
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = ErrorBody {
            errors: self.messages(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("Record Not Found".to_string()),
            other => Self::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_collects_all_messages() {
        let err = ApiError::Validation(vec![
            "Full name can't be blank".to_string(),
            "Password is too short (minimum is 8 characters)".to_string(),
        ]);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.messages().len(), 2);
        assert!(err.is_user_error());
    }

    #[test]
    fn credentials_error_is_generic() {
        let err = ApiError::InvalidCredentials;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.messages(), vec!["Invalid email or password".to_string()]);
    }

    #[test]
    fn internal_faults_do_not_leak() {
        let err = ApiError::Database("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.messages(), vec!["Internal Server Error".to_string()]);
        assert!(!err.is_user_error());
    }

    #[test]
    fn not_found_formats_resource() {
        let err = ApiError::not_found("User");
        assert_eq!(err.to_string(), "User Not Found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
