//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account entity, value objects, repository trait
//! - `application/` - Use cases, token service, OTP challenges
//! - `infra/` - Database implementation
//! - `presentation/` - HTTP handlers, DTOs, router, gate middleware
//!
//! ## Flow
//! - Register: account created, tokens issued immediately
//! - Login: password check, then a six-digit OTP is mailed
//! - Verify OTP: tokens issued, previous session revoked
//! - Gate: bearer access token, silent refresh from the `refreshToken` cookie
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Access tokens stateless (HS256, 1h)
//! - Refresh tokens (HS256, 7d) stored only as a SHA-256 fingerprint,
//!   one live session per account
//! - OTPs expire, are single use and compared in constant time

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::AuthenticatedAccount;
pub use application::config::AuthConfig;
pub use domain::value_object::{user_name::UserName, user_role::UserRole};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::extractor::CurrentAccount;
pub use presentation::router::{AuthComponents, auth_router, logout_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
