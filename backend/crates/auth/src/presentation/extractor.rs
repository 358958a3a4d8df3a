//! Authenticated account extractor.
//!
//! ```rust,ignore
//! async fn handler(CurrentAccount(me): CurrentAccount) -> impl IntoResponse { ... }
//! ```
//!
//! Only valid on routes behind [`super::middleware::require_auth`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::application::AuthenticatedAccount;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub AuthenticatedAccount);

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAccount>()
            .copied()
            .map(CurrentAccount)
            .ok_or(AuthError::MissingAccessToken)
    }
}
