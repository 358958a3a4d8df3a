//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::AccountId;

use crate::domain::entity::{account::Account, otp_challenge::OtpChallenge};
use crate::domain::value_object::{email::Email, otp_code::OtpCode, user_name::UserName};
use crate::error::AuthResult;

/// Credential store
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account. Duplicate email or user name yields `UserAlreadyExists`.
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> AuthResult<bool>;

    /// Store a challenge, replacing any outstanding one. `None` clears it.
    async fn save_otp(
        &self,
        account_id: &AccountId,
        challenge: Option<&OtpChallenge>,
    ) -> AuthResult<()>;

    /// Clear the challenge and mark the account verified, only if `code` is
    /// still the stored one. Returns whether this call consumed it.
    async fn consume_otp(&self, account_id: &AccountId, code: &OtpCode) -> AuthResult<bool>;

    /// Count a wrong guess against the challenge identified by `code`.
    ///
    /// Reaching `limit` clears the challenge in the same write. Returns the
    /// new failure count, or `None` when `code` is no longer the stored one.
    async fn record_otp_failure(
        &self,
        account_id: &AccountId,
        code: &OtpCode,
        limit: u32,
    ) -> AuthResult<Option<u32>>;

    /// Replace the stored refresh token fingerprint. `None` revokes the session.
    async fn set_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: Option<&str>,
    ) -> AuthResult<()>;

    /// Lookup used by the silent refresh: id AND stored fingerprint must match.
    async fn find_by_id_and_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: &str,
    ) -> AuthResult<Option<Account>>;
}
