//! Delete Account Use Case
//!
//! Removes the account, its posts, its likes on other posts and every
//! follow edge pointing at it.

use std::sync::Arc;

use auth::AuthenticatedAccount;
use kernel::id::AccountId;
use platform::cache::CacheStore;

use crate::application::cache::{CacheKey, ReadThroughCache};
use crate::domain::entity::profile::AccountRemoval;
use crate::domain::repository::{AccountGraphRepository, SocialRepository};
use crate::error::{SocialError, SocialResult};

pub struct DeleteAccountUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> DeleteAccountUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    /// Only the account itself or an admin may delete it.
    pub async fn execute(
        &self,
        actor: AuthenticatedAccount,
        target: AccountId,
    ) -> SocialResult<AccountRemoval> {
        if actor.account_id != target && !actor.role.is_admin() {
            return Err(SocialError::Forbidden);
        }

        let removal = self
            .repo
            .delete_account(&target)
            .await?
            .ok_or(SocialError::AccountNotFound)?;

        self.cache.invalidate(invalidation_keys(target, &removal)).await;

        tracing::info!(
            account_id = %target,
            deleted_by = %actor.account_id,
            posts = removal.deleted_posts.len(),
            unliked = removal.unliked_posts.len(),
            "Account deleted"
        );

        Ok(removal)
    }
}

fn invalidation_keys(target: AccountId, removal: &AccountRemoval) -> Vec<CacheKey> {
    let mut keys = vec![
        CacheKey::Profile(target),
        CacheKey::AccountPosts(target),
        CacheKey::AllAccounts,
        CacheKey::AllPosts,
    ];
    keys.extend(removal.deleted_posts.iter().copied().map(CacheKey::Post));
    for (post_id, owner) in &removal.unliked_posts {
        keys.extend([
            CacheKey::Post(*post_id),
            CacheKey::Profile(*owner),
            CacheKey::AccountPosts(*owner),
        ]);
    }
    keys.extend(removal.touched_accounts.iter().copied().map(CacheKey::Profile));
    keys
}
