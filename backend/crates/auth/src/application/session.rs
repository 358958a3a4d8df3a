//! Session issuance shared by registration and OTP verification.

use kernel::id::AccountId;
use platform::crypto::sha256_hex;

use crate::application::token::TokenService;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthResult;

/// Tokens handed to the client after a successful sign-in.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mint both tokens and store the refresh fingerprint, which revokes any
/// previous session of the account.
pub(crate) async fn start_session<R>(
    repo: &R,
    tokens: &TokenService,
    account_id: &AccountId,
    role: UserRole,
) -> AuthResult<IssuedSession>
where
    R: AccountRepository,
{
    let access_token = tokens.issue_access_token(account_id, role)?;
    let refresh_token = tokens.issue_refresh_token(account_id)?;

    repo.set_refresh_token(account_id, Some(&refresh_fingerprint(&refresh_token)))
        .await?;

    Ok(IssuedSession {
        access_token,
        refresh_token,
    })
}

/// Stored form of a refresh token.
pub fn refresh_fingerprint(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
