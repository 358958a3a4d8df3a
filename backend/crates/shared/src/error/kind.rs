//! Error Kind
//!
//! The closed set of failure classes the API reports, each bound to one
//! HTTP status.

use serde::Serialize;

/// Failure class of an [`super::app_error::AppError`].
///
/// Every variant maps to exactly one HTTP status. Domain crates pick the
/// kind; the response body and status follow from it.
///
/// ## Notes
/// * `non_exhaustive` - new classes may be added without a breaking change
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Conflict.status_code(), 409);
/// assert!(ErrorKind::ServiceUnavailable.is_server_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Invalid input, self-follow, malformed ids
    BadRequest,
    /// No usable access or refresh token
    Unauthorized,
    /// Session superseded, or acting on someone else's content
    Forbidden,
    NotFound,
    /// Duplicate user name or email
    Conflict,
    TooManyRequests,
    InternalServerError,
    /// Database or mail relay unreachable
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP status for this kind.
    ///
    /// ## Returns
    /// The numeric status code, always in the 4xx or 5xx range
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
    /// assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Reason phrase, also the client-facing message for 5xx.
    #[inline]
    pub const fn reason(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}
