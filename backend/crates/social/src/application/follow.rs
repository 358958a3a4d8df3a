//! Follow Toggle Use Case

use std::sync::Arc;

use kernel::id::AccountId;
use platform::cache::CacheStore;

use crate::application::cache::{CacheKey, ReadThroughCache};
use crate::domain::repository::{AccountGraphRepository, SocialRepository};
use crate::error::{SocialError, SocialResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

impl FollowOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            FollowOutcome::Followed => "User followed!",
            FollowOutcome::Unfollowed => "User unfollowed!",
        }
    }
}

pub struct ToggleFollowUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> ToggleFollowUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    /// Follow `target` if `actor` does not follow it yet, otherwise unfollow.
    pub async fn execute(
        &self,
        actor: AccountId,
        target: AccountId,
    ) -> SocialResult<FollowOutcome> {
        if actor == target {
            return Err(SocialError::CannotFollowSelf);
        }

        if self.repo.find_account(&target).await?.is_none() {
            return Err(SocialError::AccountNotFound);
        }

        // Each call is a guarded set update, so a concurrent toggle can only
        // make one of them a no-op.
        let outcome = if self.repo.unfollow(&actor, &target).await? {
            FollowOutcome::Unfollowed
        } else {
            self.repo.follow(&actor, &target).await?;
            FollowOutcome::Followed
        };

        // Follower and following counts live in both profile snapshots.
        self.cache
            .invalidate([
                CacheKey::Profile(actor),
                CacheKey::Profile(target),
                CacheKey::AllAccounts,
            ])
            .await;

        tracing::info!(actor = %actor, target = %target, outcome = ?outcome, "Follow toggled");
        Ok(outcome)
    }
}
