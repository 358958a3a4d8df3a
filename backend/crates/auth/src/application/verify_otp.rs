//! Verify OTP Use Case
//!
//! Second factor. Success marks the account verified and starts a session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::otp::OtpChallengeManager;
use crate::application::session::{IssuedSession, start_session};
use crate::application::token::TokenService;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthResult, OtpError};

pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
}

pub struct VerifyOtpOutput {
    pub account: Account,
    pub session: IssuedSession,
}

pub struct VerifyOtpUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R> VerifyOtpUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: VerifyOtpInput) -> AuthResult<VerifyOtpOutput> {
        let account = match Email::new(&input.email) {
            Ok(email) => self.repo.find_by_email(&email).await?,
            Err(_) => None,
        };
        // Unknown accounts look exactly like accounts without a pending code.
        let mut account = account.ok_or(OtpError::NoActiveChallenge)?;

        let manager = OtpChallengeManager::new(self.repo.clone(), self.config.otp_ttl);
        manager.verify(&account, &input.otp).await?;

        account.otp = None;
        account.is_verified = true;

        let session =
            start_session(&*self.repo, &self.tokens, &account.account_id, account.role).await?;

        tracing::info!(account_id = %account.account_id, "Login completed");

        Ok(VerifyOtpOutput { account, session })
    }
}
