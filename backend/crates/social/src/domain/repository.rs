//! Repository Traits
//!
//! Every set mutation (follow, like, post ownership) is a guarded atomic
//! update in the store; nothing here reads, modifies and writes back a
//! whole array.

use kernel::id::{AccountId, PostId};

use crate::domain::entity::post::Post;
use crate::domain::entity::profile::{AccountProfile, AccountRemoval, ProfileUpdate};
use crate::domain::value_object::caption::Caption;
use crate::error::SocialResult;

/// Profiles and the follow graph
#[trait_variant::make(AccountGraphRepository: Send)]
pub trait LocalAccountGraphRepository {
    async fn find_account(&self, account_id: &AccountId) -> SocialResult<Option<AccountProfile>>;

    /// Missing ids are skipped.
    async fn find_accounts(&self, account_ids: &[AccountId]) -> SocialResult<Vec<AccountProfile>>;

    async fn list_accounts(&self) -> SocialResult<Vec<AccountProfile>>;

    /// Returns the updated profile, `None` if the account does not exist.
    /// A taken user name yields `Conflict`.
    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> SocialResult<Option<AccountProfile>>;

    /// Add the edge on both sides. Returns `false` if it already existed,
    /// `AccountNotFound` if either side is gone.
    async fn follow(&self, follower: &AccountId, followee: &AccountId) -> SocialResult<bool>;

    /// Remove the edge on both sides. Returns `false` if it did not exist.
    async fn unfollow(&self, follower: &AccountId, followee: &AccountId) -> SocialResult<bool>;

    /// Delete the account with its posts, likes and graph edges in one
    /// transaction. `None` if the account does not exist.
    async fn delete_account(&self, account_id: &AccountId) -> SocialResult<Option<AccountRemoval>>;
}

/// Posts and likes
#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Insert the post and append it to the owner's `posts`.
    async fn create_post(&self, post: &Post) -> SocialResult<()>;

    async fn find_post(&self, post_id: &PostId) -> SocialResult<Option<Post>>;

    /// Newest first
    async fn list_posts(&self) -> SocialResult<Vec<Post>>;

    /// Newest first
    async fn list_posts_by_owner(&self, owner: &AccountId) -> SocialResult<Vec<Post>>;

    async fn update_caption(
        &self,
        post_id: &PostId,
        caption: &Caption,
    ) -> SocialResult<Option<Post>>;

    /// Delete the post and prune it from the owner's `posts` and every
    /// liker's `liked_posts`. Returns the deleted post.
    async fn delete_post(&self, post_id: &PostId) -> SocialResult<Option<Post>>;

    /// Returns `false` if the account had already liked the post or the post
    /// is gone, `AccountNotFound` if the account is.
    async fn add_like(&self, post_id: &PostId, account_id: &AccountId) -> SocialResult<bool>;

    /// Returns `false` if the account had not liked the post.
    async fn remove_like(&self, post_id: &PostId, account_id: &AccountId) -> SocialResult<bool>;
}

/// Both stores behind one handle, as the Postgres implementation provides.
pub trait SocialRepository: AccountGraphRepository + PostRepository + Send + Sync + 'static {}

impl<T> SocialRepository for T where
    T: AccountGraphRepository + PostRepository + Send + Sync + 'static
{
}
