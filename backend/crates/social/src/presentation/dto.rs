//! API DTOs (Data Transfer Objects)
//!
//! Field names follow the public JSON contract (`_id`, camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{AccountListing, PostView, ProfileSnapshot};
use crate::domain::entity::post::Post;
use crate::domain::entity::profile::{AccountCard, AccountProfile, ProfileStats};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostRequest {
    pub caption: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub caption: String,
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AccountCardDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "profilePic")]
    pub profile_pic: String,
}

impl From<&AccountCard> for AccountCardDto {
    fn from(card: &AccountCard) -> Self {
        Self {
            id: card.account_id.to_string(),
            username: card.user_name.as_str().to_string(),
            profile_pic: card.profile_pic.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsDto {
    pub posts: usize,
    pub followers: usize,
    pub following: usize,
}

impl From<ProfileStats> for StatsDto {
    fn from(stats: ProfileStats) -> Self {
        Self {
            posts: stats.posts,
            followers: stats.followers,
            following: stats.following,
        }
    }
}

/// `GET /api/users/profile` and `GET /api/users/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub profile_pic: String,
    pub bio: String,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub posts: Vec<PostDto>,
    pub stats: StatsDto,
}

impl From<ProfileSnapshot> for ProfileResponse {
    fn from(snapshot: ProfileSnapshot) -> Self {
        let ProfileSnapshot { profile, posts } = snapshot;
        Self {
            id: profile.account_id.to_string(),
            username: profile.user_name.as_str().to_string(),
            profile_pic: profile.profile_pic.as_str().to_string(),
            bio: profile.bio.as_str().to_string(),
            followers: profile.followers.iter().map(|id| id.to_string()).collect(),
            following: profile.following.iter().map(|id| id.to_string()).collect(),
            stats: profile.stats().into(),
            posts: posts.iter().map(|p| PostDto::new(p, None)).collect(),
        }
    }
}

/// One entry of `GET /api/users/allUsers`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListingDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub profile_pic: String,
    pub bio: String,
    pub stats: StatsDto,
}

impl From<&AccountListing> for AccountListingDto {
    fn from(listing: &AccountListing) -> Self {
        Self {
            id: listing.account_id.to_string(),
            username: listing.user_name.as_str().to_string(),
            profile_pic: listing.profile_pic.as_str().to_string(),
            bio: listing.bio.as_str().to_string(),
            stats: listing.stats.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountListResponse {
    pub success: bool,
    pub users: Vec<AccountListingDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedAccountDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub profile_pic: String,
    pub bio: String,
}

impl From<&AccountProfile> for UpdatedAccountDto {
    fn from(profile: &AccountProfile) -> Self {
        Self {
            id: profile.account_id.to_string(),
            username: profile.user_name.as_str().to_string(),
            profile_pic: profile.profile_pic.as_str().to_string(),
            bio: profile.bio.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub user: UpdatedAccountDto,
    pub message: &'static str,
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    #[serde(rename = "_id")]
    pub id: String,
    /// Owner id
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountCardDto>,
    pub image: String,
    pub caption: String,
    pub likes: Vec<String>,
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostDto {
    pub fn new(post: &Post, author: Option<&AccountCard>) -> Self {
        Self {
            id: post.post_id.to_string(),
            user: post.owner.to_string(),
            author: author.map(AccountCardDto::from),
            image: post.image_url.as_str().to_string(),
            caption: post.caption.as_str().to_string(),
            likes: post.likes.iter().map(|id| id.to_string()).collect(),
            like_count: post.like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<&PostView> for PostDto {
    fn from(view: &PostView) -> Self {
        Self::new(&view.post, view.author.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub message: &'static str,
    pub posts: Vec<PostDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountPostsResponse {
    pub success: bool,
    pub posts: Vec<PostDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub data: PostDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostMutationResponse {
    pub success: bool,
    pub message: &'static str,
    pub post: PostDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    pub success: bool,
    pub likes_count: usize,
    pub likes: Vec<AccountCardDto>,
}

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
