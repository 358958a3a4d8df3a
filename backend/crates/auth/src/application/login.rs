//! Login Use Case
//!
//! First factor only. A correct password issues an OTP; tokens come from
//! [`super::verify_otp`].

use std::sync::Arc;

use platform::password::{ClearTextPassword, verify_dummy};

use crate::application::config::AuthConfig;
use crate::application::otp::{OtpChallengeManager, OtpDispatcher};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    dispatcher: OtpDispatcher,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, dispatcher: OtpDispatcher, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            dispatcher,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<()> {
        let password = ClearTextPassword::for_verification(input.password);

        // A malformed address cannot belong to anyone.
        let account = match Email::new(&input.email) {
            Ok(email) => self.repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            // Same work as a real check so response time does not reveal existence.
            verify_dummy(&password);
            return Err(AuthError::InvalidCredentials);
        };

        if !account.password_hash.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let manager = OtpChallengeManager::new(self.repo.clone(), self.config.otp_ttl);
        let code = manager.issue(&account).await?;
        self.dispatcher.dispatch(&account.email, &code)?;

        tracing::info!(account_id = %account.account_id, "OTP issued for login");
        Ok(())
    }
}
