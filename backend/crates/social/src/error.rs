//! Social Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type SocialResult<T> = Result<T, SocialError>;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("User not found")]
    AccountNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("You can't follow yourself!")]
    CannotFollowSelf,

    /// Acting on someone else's post or account.
    #[error("Unauthorized")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SocialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SocialError::AccountNotFound | SocialError::PostNotFound => ErrorKind::NotFound,
            SocialError::CannotFollowSelf | SocialError::Validation(_) => ErrorKind::BadRequest,
            SocialError::Forbidden => ErrorKind::Forbidden,
            SocialError::Conflict(_) => ErrorKind::Conflict,
            SocialError::Database(_) | SocialError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            SocialError::Database(e) => {
                tracing::error!(error = %e, "Social database error");
            }
            SocialError::Internal(msg) => {
                tracing::error!(message = %msg, "Social internal error");
            }
            SocialError::Forbidden => {
                tracing::warn!("Ownership check failed");
            }
            _ => {
                tracing::debug!(error = %self, "Social error");
            }
        }
    }
}

impl IntoResponse for SocialError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<auth::domain::value_object::user_name::UserNameError> for SocialError {
    fn from(err: auth::domain::value_object::user_name::UserNameError) -> Self {
        SocialError::Validation(err.to_string())
    }
}

impl From<uuid::Error> for SocialError {
    fn from(_: uuid::Error) -> Self {
        SocialError::Validation("Invalid id".to_string())
    }
}
