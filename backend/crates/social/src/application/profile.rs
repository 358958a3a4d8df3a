//! Profile Use Cases
//!
//! Reading and editing profiles, and the public account listing.

use std::sync::Arc;

use auth::UserName;
use kernel::id::AccountId;
use platform::cache::CacheStore;
use serde::{Deserialize, Serialize};

use crate::application::cache::{CacheKey, ReadThroughCache};
use crate::domain::entity::post::Post;
use crate::domain::entity::profile::{AccountProfile, ProfileStats, ProfileUpdate};
use crate::domain::repository::{AccountGraphRepository, PostRepository, SocialRepository};
use crate::domain::value_object::{bio::Bio, image_url::ImageUrl};
use crate::error::{SocialError, SocialResult};

/// Cached under `user:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub profile: AccountProfile,
    /// Newest first
    pub posts: Vec<Post>,
}

// ============================================================================
// Get Profile
// ============================================================================

pub struct GetProfileUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> GetProfileUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self, account_id: AccountId) -> SocialResult<ProfileSnapshot> {
        self.cache
            .get_or_load(CacheKey::Profile(account_id), || async {
                let profile = self
                    .repo
                    .find_account(&account_id)
                    .await?
                    .ok_or(SocialError::AccountNotFound)?;
                let posts = self.repo.list_posts_by_owner(&account_id).await?;
                Ok::<_, SocialError>(ProfileSnapshot { profile, posts })
            })
            .await
    }
}

// ============================================================================
// Update Profile
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

pub struct UpdateProfileUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> UpdateProfileUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(
        &self,
        account_id: AccountId,
        input: UpdateProfileInput,
    ) -> SocialResult<AccountProfile> {
        let update = ProfileUpdate {
            user_name: input.username.as_deref().map(UserName::new).transpose()?,
            bio: input.bio.as_deref().map(Bio::new).transpose()?,
            profile_pic: input
                .profile_pic
                .as_deref()
                .map(ImageUrl::new)
                .transpose()?,
        };

        if update.is_empty() {
            return Err(SocialError::Validation("Nothing to update".to_string()));
        }

        let profile = self
            .repo
            .update_profile(&account_id, &update)
            .await?
            .ok_or(SocialError::AccountNotFound)?;

        // Post snapshots embed the author's name and picture.
        let mut keys = vec![
            CacheKey::Profile(account_id),
            CacheKey::AccountPosts(account_id),
            CacheKey::AllAccounts,
            CacheKey::AllPosts,
        ];
        keys.extend(profile.posts.iter().copied().map(CacheKey::Post));
        self.cache.invalidate(keys).await;

        tracing::info!(account_id = %account_id, "Profile updated");
        Ok(profile)
    }
}

// ============================================================================
// List Accounts
// ============================================================================

/// Public fields only. Cached under `allUsers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountListing {
    pub account_id: AccountId,
    pub user_name: UserName,
    pub profile_pic: ImageUrl,
    pub bio: Bio,
    pub stats: ProfileStats,
}

impl From<&AccountProfile> for AccountListing {
    fn from(profile: &AccountProfile) -> Self {
        Self {
            account_id: profile.account_id,
            user_name: profile.user_name.clone(),
            profile_pic: profile.profile_pic.clone(),
            bio: profile.bio.clone(),
            stats: profile.stats(),
        }
    }
}

pub struct ListAccountsUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    repo: Arc<R>,
    cache: ReadThroughCache<C>,
}

impl<R, C> ListAccountsUseCase<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, cache: ReadThroughCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self) -> SocialResult<Vec<AccountListing>> {
        self.cache
            .get_or_load(CacheKey::AllAccounts, || async {
                let accounts = self.repo.list_accounts().await?;
                let listing = accounts.iter().map(AccountListing::from).collect::<Vec<_>>();
                Ok::<_, SocialError>(listing)
            })
            .await
    }
}
