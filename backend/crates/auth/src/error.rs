//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a token failed verification.
///
/// Only `Expired` is recoverable (through the refresh token).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token malformed")]
    Malformed,

    #[error("Token signature invalid")]
    BadSignature,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Second-factor failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("No active OTP, please log in again")]
    NoActiveChallenge,

    #[error("Invalid OTP")]
    Mismatch,

    #[error("OTP has expired, please log in again")]
    Expired,

    /// Wrong code entered too often; the challenge is gone.
    #[error("Too many invalid OTP attempts, please log in again")]
    AttemptsExhausted,
}

/// Auth-specific error variants
///
/// The `Display` text is what the client receives.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserAlreadyExists,

    /// Wrong password and unknown email share this variant.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    AccountNotFound,

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("Unauthorized: No access token provided")]
    MissingAccessToken,

    #[error("Unauthorized: Invalid access token")]
    InvalidAccessToken,

    #[error("Unauthorized: No refresh token provided")]
    MissingRefreshToken,

    #[error("Unauthorized: Invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh token is genuine but no longer the one stored on the account.
    #[error("Unauthorized: User not found")]
    SessionRevoked,

    #[error("{0}")]
    Validation(String),

    #[error("Too many attempts, please try again later.")]
    RateLimited,

    #[error("Unable to send OTP right now, please try again later")]
    MailUnavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserAlreadyExists => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::MissingAccessToken
            | AuthError::InvalidAccessToken
            | AuthError::MissingRefreshToken => ErrorKind::Unauthorized,
            AuthError::InvalidRefreshToken | AuthError::SessionRevoked => ErrorKind::Forbidden,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::Otp(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::RateLimited => ErrorKind::TooManyRequests,
            AuthError::MailUnavailable => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::MailUnavailable => {
                tracing::error!("OTP mail queue unavailable");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidRefreshToken | AuthError::SessionRevoked => {
                tracing::warn!(error = %self, "Refresh token rejected");
            }
            AuthError::RateLimited => {
                tracing::warn!("Auth rate limit hit");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AuthError::Internal(msg),
            TokenError::Expired | TokenError::Malformed | TokenError::BadSignature => {
                AuthError::InvalidAccessToken
            }
        }
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_statuses() {
        assert_eq!(AuthError::MissingAccessToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidAccessToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingRefreshToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidRefreshToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::SessionRevoked.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_messages_reach_client() {
        let app = AuthError::SessionRevoked.to_app_error();
        assert_eq!(app.public_message(), "Unauthorized: User not found");

        let app = AuthError::Otp(OtpError::Mismatch).to_app_error();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.public_message(), "Invalid OTP");
    }

    #[test]
    fn test_internal_details_hidden() {
        let app = AuthError::Internal("argon2 exploded".into()).to_app_error();
        assert_eq!(app.public_message(), "Internal Server Error");
    }
}
