//! Logout Use Case
//!
//! Clearing the stored fingerprint makes every outstanding refresh token
//! for the account fail the gate's lookup.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::repository::AccountRepository;
use crate::error::AuthResult;

pub struct LogoutUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, account_id: &AccountId) -> AuthResult<()> {
        self.repo.set_refresh_token(account_id, None).await?;
        tracing::info!(account_id = %account_id, "Logged out");
        Ok(())
    }
}
