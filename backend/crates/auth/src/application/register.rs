//! Register Use Case

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::session::{IssuedSession, start_session};
use crate::application::token::TokenService;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterOutput {
    pub account: Account,
    pub session: IssuedSession,
}

pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let user_name = UserName::new(&input.user_name)?;
        let email = Email::new(&input.email)?;
        let password = ClearTextPassword::new(input.password)?;

        if self
            .repo
            .exists_by_email_or_user_name(&email, &user_name)
            .await?
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = password.hash(self.config.pepper())?;
        let account = Account::new(user_name, email, password_hash);

        // A concurrent registration can still win the race; the unique
        // constraints surface it as `UserAlreadyExists`.
        self.repo.create(&account).await?;

        let session =
            start_session(&*self.repo, &self.tokens, &account.account_id, account.role).await?;

        tracing::info!(
            account_id = %account.account_id,
            user_name = %account.user_name.as_str(),
            "Account registered"
        );

        Ok(RegisterOutput { account, session })
    }
}
