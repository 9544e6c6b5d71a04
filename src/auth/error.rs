// Authentication error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, warn};

use crate::error::ErrorResponse;

/// Authentication and token-rotation error types
///
/// "No such email" and "wrong password" both map to `InvalidCredentials`
/// so the responses are byte-identical and accounts cannot be enumerated.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("No refresh token provided")]
    MissingRefreshToken,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Invalid refresh token or token reused")]
    RefreshTokenReused,

    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Request validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Password hashing error")]
    PasswordHashError,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl AuthError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::EmailNotVerified => StatusCode::FORBIDDEN,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::MissingRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidRefreshToken => StatusCode::FORBIDDEN,
            AuthError::RefreshTokenReused => StatusCode::FORBIDDEN,
            AuthError::InvalidVerificationToken => StatusCode::BAD_REQUEST,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::PasswordHashError => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for the response body
    fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "MISSING_CREDENTIALS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            AuthError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AuthError::MissingRefreshToken => "MISSING_REFRESH_TOKEN",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::RefreshTokenReused => "REFRESH_TOKEN_REUSED",
            AuthError::InvalidVerificationToken => "INVALID_VERIFICATION_TOKEN",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::ValidationError(_) => "VALIDATION_ERROR",
            AuthError::DatabaseError(_) => "DATABASE_ERROR",
            AuthError::PasswordHashError => "INTERNAL_ERROR",
            AuthError::TokenGenerationError(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message; internals are withheld for 500-level errors
    fn client_message(&self) -> String {
        match self {
            AuthError::DatabaseError(_)
            | AuthError::PasswordHashError
            | AuthError::TokenGenerationError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::ValidationError(errors) => {
                debug!("Request validation failed: {:?}", errors);
            }
            AuthError::InvalidCredentials => {
                debug!("Login attempt with invalid credentials");
            }
            AuthError::EmailNotVerified => {
                debug!("Login attempt before email verification");
            }
            AuthError::RefreshTokenReused => {
                warn!("Refresh token reuse detected");
            }
            AuthError::InvalidRefreshToken
            | AuthError::MissingRefreshToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingToken => {
                warn!("Token rejected: {}", self);
            }
            AuthError::DatabaseError(msg) => {
                error!("Database error in auth: {}", msg);
            }
            AuthError::PasswordHashError => {
                error!("Password hashing error");
            }
            AuthError::TokenGenerationError(msg) => {
                error!("Token generation error: {}", msg);
            }
            _ => {}
        }

        let details = match &self {
            AuthError::ValidationError(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        let body = ErrorResponse::new(self.error_code(), self.client_message()).with_details(details);
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_are_indistinguishable() {
        // Unknown email and wrong password must share one variant, one
        // status, and one message
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_unverified_email_is_forbidden_not_unauthorized() {
        assert_eq!(AuthError::EmailNotVerified.status_code(), StatusCode::FORBIDDEN);
        assert_ne!(
            AuthError::EmailNotVerified.status_code(),
            AuthError::InvalidCredentials.status_code()
        );
    }

    #[test]
    fn test_refresh_failure_statuses() {
        assert_eq!(AuthError::MissingRefreshToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidRefreshToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::RefreshTokenReused.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_errors_hide_details_from_clients() {
        let err = AuthError::DatabaseError("connection refused to 10.0.0.5".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AuthError::TokenGenerationError("bad key material".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
