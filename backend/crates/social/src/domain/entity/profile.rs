//! Account Profile Entity
//!
//! Social side of an account: public profile fields and the graph edges.

use auth::{UserName, UserRole};
use chrono::{DateTime, Utc};
use kernel::id::{AccountId, PostId};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{bio::Bio, image_url::ImageUrl};

pub const DEFAULT_PROFILE_PIC: &str = "https://plus.unsplash.com/premium_photo-1676068243734-cfdb9fc4ef59?w=600&auto=format&fit=crop&q=60&ixlib=rb-4.0.3&ixid=M3wxMjA3fDB8MHxzZWFyY2h8MTN8fGxpZ2h0JTIwYmx1ZSUyMGJhY2tncm91bmQlMjBpbWd8ZW58MHx8MHx8fDA%3D";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_id: AccountId,
    pub user_name: UserName,
    pub role: UserRole,
    pub profile_pic: ImageUrl,
    pub bio: Bio,
    /// Never contains `account_id` itself.
    pub followers: Vec<AccountId>,
    pub following: Vec<AccountId>,
    /// Newest last
    pub posts: Vec<PostId>,
    pub liked_posts: Vec<PostId>,
    pub created_at: DateTime<Utc>,
}

impl AccountProfile {
    pub fn stats(&self) -> ProfileStats {
        ProfileStats {
            posts: self.posts.len(),
            followers: self.followers.len(),
            following: self.following.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub posts: usize,
    pub followers: usize,
    pub following: usize,
}

/// Display data for an author or a liker, joined at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCard {
    pub account_id: AccountId,
    pub user_name: UserName,
    pub profile_pic: ImageUrl,
}

impl From<&AccountProfile> for AccountCard {
    fn from(profile: &AccountProfile) -> Self {
        Self {
            account_id: profile.account_id,
            user_name: profile.user_name.clone(),
            profile_pic: profile.profile_pic.clone(),
        }
    }
}

/// Fields a user may change on their own profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub user_name: Option<UserName>,
    pub bio: Option<Bio>,
    pub profile_pic: Option<ImageUrl>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.bio.is_none() && self.profile_pic.is_none()
    }
}

/// What an account deletion touched, for cache invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRemoval {
    pub deleted_posts: Vec<PostId>,
    /// Other accounts' posts the deleted account had liked, with their owners
    pub unliked_posts: Vec<(PostId, AccountId)>,
    /// Followers, followees and likers of the deleted posts: accounts whose
    /// own lists lost an id
    pub touched_accounts: Vec<AccountId>,
}
