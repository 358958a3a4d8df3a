//! Post Use Cases

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use auth::AuthenticatedAccount;
use kernel::id::{AccountId, PostId};
use platform::cache::CacheStore;
use serde::{Deserialize, Serialize};

use crate::application::cache::{CacheKey, ReadThroughCache, post_keys};
use crate::domain::entity::post::Post;
use crate::domain::entity::profile::AccountCard;
use crate::domain::repository::{AccountGraphRepository, PostRepository, SocialRepository};
use crate::domain::value_object::{caption::Caption, image_url::ImageUrl};
use crate::error::{SocialError, SocialResult};

/// A post with its author's display data. Cached under `post:{id}` and,
/// as a list, under `allPosts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    /// `None` only if the author vanished between the two reads
    pub author: Option<AccountCard>,
}

/// Join author display data onto posts, one store round trip.
pub(crate) async fn with_authors<R>(repo: &R, posts: Vec<Post>) -> SocialResult<Vec<PostView>>
where
    R: AccountGraphRepository,
{
    let mut seen = HashSet::new();
    let owners: Vec<AccountId> = posts
        .iter()
        .map(|p| p.owner)
        .filter(|id| seen.insert(*id))
        .collect();

    let authors: HashMap<AccountId, AccountCard> = repo
        .find_accounts(&owners)
        .await?
        .iter()
        .map(|profile| (profile.account_id, AccountCard::from(profile)))
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.owner).cloned();
            PostView { post, author }
        })
        .collect())
}

/// Load a post and check that `actor` owns it.
async fn owned_post<R>(repo: &R, actor: &AccountId, post_id: &PostId) -> SocialResult<Post>
where
    R: PostRepository,
{
    let post = repo
        .find_post(post_id)
        .await?
        .ok_or(SocialError::PostNotFound)?;

    if !post.is_owned_by(actor) {
        return Err(SocialError::Forbidden);
    }
    Ok(post)
}

// ============================================================================
// Create
// ============================================================================

pub struct CreatePostInput {
    pub caption: Option<String>,
    pub image: Option<String>,
}

pub struct CreatePostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> CreatePostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(
        &self,
        actor: AuthenticatedAccount,
        input: CreatePostInput,
    ) -> SocialResult<Post> {
        let (Some(caption), Some(image)) = (input.caption, input.image) else {
            return Err(SocialError::Validation(
                "Caption and image are required".to_string(),
            ));
        };

        let post = Post::new(
            actor.account_id,
            ImageUrl::new(&image)?,
            Caption::new(&caption)?,
        );
        self.repo.create_post(&post).await?;

        self.cache
            .invalidate([
                CacheKey::AllPosts,
                CacheKey::Profile(actor.account_id),
                CacheKey::AccountPosts(actor.account_id),
            ])
            .await;

        tracing::info!(post_id = %post.post_id, owner = %post.owner, "Post created");
        Ok(post)
    }
}

// ============================================================================
// Read
// ============================================================================

pub struct GetPostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> GetPostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self, post_id: PostId) -> SocialResult<PostView> {
        self.cache
            .get_or_load(CacheKey::Post(post_id), || async {
                let post = self
                    .repo
                    .find_post(&post_id)
                    .await?
                    .ok_or(SocialError::PostNotFound)?;
                let mut views = with_authors(&*self.repo, vec![post]).await?;
                views.pop().ok_or(SocialError::PostNotFound)
            })
            .await
    }
}

pub struct ListPostsUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> ListPostsUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    /// Every post, newest first.
    pub async fn execute(&self) -> SocialResult<Vec<PostView>> {
        self.cache
            .get_or_load(CacheKey::AllPosts, || async {
                let posts = self.repo.list_posts().await?;
                with_authors(&*self.repo, posts).await
            })
            .await
    }
}

pub struct ListAccountPostsUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> ListAccountPostsUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    /// Posts of one account, newest first. Unknown accounts have none.
    pub async fn execute(&self, owner: AccountId) -> SocialResult<Vec<Post>> {
        self.cache
            .get_or_load(CacheKey::AccountPosts(owner), || {
                self.repo.list_posts_by_owner(&owner)
            })
            .await
    }
}

// ============================================================================
// Update / Delete (owner only)
// ============================================================================

pub struct UpdatePostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> UpdatePostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(
        &self,
        actor: AuthenticatedAccount,
        post_id: PostId,
        caption: &str,
    ) -> SocialResult<Post> {
        let caption = Caption::new(caption)?;
        let post = owned_post(&*self.repo, &actor.account_id, &post_id).await?;

        let updated = self
            .repo
            .update_caption(&post_id, &caption)
            .await?
            .ok_or(SocialError::PostNotFound)?;

        self.cache.invalidate(post_keys(post_id, post.owner)).await;

        tracing::info!(post_id = %post_id, "Post updated");
        Ok(updated)
    }
}

pub struct DeletePostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> DeletePostUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(
        &self,
        actor: AuthenticatedAccount,
        post_id: PostId,
    ) -> SocialResult<()> {
        owned_post(&*self.repo, &actor.account_id, &post_id).await?;

        let deleted = self
            .repo
            .delete_post(&post_id)
            .await?
            .ok_or(SocialError::PostNotFound)?;

        // Likers' profiles list the post among their liked posts.
        let mut keys = post_keys(post_id, deleted.owner).to_vec();
        keys.extend(deleted.likes.iter().copied().map(CacheKey::Profile));
        self.cache.invalidate(keys).await;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }
}
