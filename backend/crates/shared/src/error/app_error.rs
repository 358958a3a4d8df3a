//! Application Error
//!
//! [`AppError`] is what leaves the server. Each crate keeps its own error
//! enum and converts at the HTTP boundary.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// A classified failure with a client-facing message.
///
/// The optional `source` is only ever logged.
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::NotFound, "Post not found");
/// assert_eq!(err.status_code(), 404);
/// assert_eq!(err.public_message(), "Post not found");
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    #[inline]
    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Server errors collapse to the reason phrase so internals never reach
    /// the client.
    pub fn public_message(&self) -> &str {
        if self.kind.is_server_error() {
            self.kind.reason()
        } else {
            &self.message
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.status_code())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::conflict("User already exists");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.public_message(), "User already exists");
        assert_eq!(err.to_string(), "User already exists (409)");
    }

    #[test]
    fn test_server_errors_hide_their_message() {
        let err = AppError::internal("connection refused on 10.0.0.3:5432");
        assert_eq!(err.message(), "connection refused on 10.0.0.3:5432");
        assert_eq!(err.public_message(), "Internal Server Error");

        let err = AppError::service_unavailable("redis timeout");
        assert_eq!(err.public_message(), "Service Unavailable");
    }

    #[test]
    fn test_source_is_kept_for_logs() {
        let err = AppError::bad_request("Invalid id")
            .with_source(std::io::Error::other("parse failure"));
        assert!(err.source().is_some());
        assert!(format!("{err:?}").contains("parse failure"));
    }
}
