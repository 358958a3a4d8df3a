//! Like Use Cases

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{AccountId, PostId};
use platform::cache::CacheStore;

use crate::application::cache::{CacheKey, ReadThroughCache, post_keys};
use crate::domain::entity::post::Post;
use crate::domain::entity::profile::AccountCard;
use crate::domain::repository::{AccountGraphRepository, PostRepository, SocialRepository};
use crate::error::{SocialError, SocialResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

impl LikeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            LikeOutcome::Liked => "Post liked",
            LikeOutcome::Unliked => "Post unliked",
        }
    }
}

pub struct ToggleLikeUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> ToggleLikeUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    /// Like the post, or unlike it if `actor` already does. Returns the
    /// post as stored after the change.
    pub async fn execute(
        &self,
        actor: AccountId,
        post_id: PostId,
    ) -> SocialResult<(LikeOutcome, Post)> {
        let post = self
            .repo
            .find_post(&post_id)
            .await?
            .ok_or(SocialError::PostNotFound)?;

        let outcome = if self.repo.remove_like(&post_id, &actor).await? {
            LikeOutcome::Unliked
        } else {
            self.repo.add_like(&post_id, &actor).await?;
            LikeOutcome::Liked
        };

        // Like counts are embedded in post, listing and profile snapshots;
        // the actor's profile lists liked posts.
        let mut keys = post_keys(post_id, post.owner).to_vec();
        keys.push(CacheKey::Profile(actor));
        self.cache.invalidate(keys).await;

        let updated = self
            .repo
            .find_post(&post_id)
            .await?
            .ok_or(SocialError::PostNotFound)?;

        tracing::debug!(post_id = %post_id, actor = %actor, outcome = ?outcome, "Like toggled");
        Ok((outcome, updated))
    }
}

pub struct ListLikesUseCase<R>
where
    R: SocialRepository,
{
    repo: Arc<R>,
}

impl<R> ListLikesUseCase<R>
where
    R: SocialRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Likers in like order, with display data read now rather than at
    /// like time.
    pub async fn execute(&self, post_id: PostId) -> SocialResult<Vec<AccountCard>> {
        let post = self
            .repo
            .find_post(&post_id)
            .await?
            .ok_or(SocialError::PostNotFound)?;

        let mut cards: HashMap<AccountId, AccountCard> = self
            .repo
            .find_accounts(&post.likes)
            .await?
            .iter()
            .map(|profile| (profile.account_id, AccountCard::from(profile)))
            .collect();

        Ok(post.likes.iter().filter_map(|id| cards.remove(id)).collect())
    }
}
