//! Post Entity

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, PostId};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{caption::Caption, image_url::ImageUrl};

/// An image post.
///
/// `likes` is a set of account ids and `like_count` always equals its size;
/// the store updates both in one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    /// Immutable after creation
    pub owner: AccountId,
    pub image_url: ImageUrl,
    pub caption: Caption,
    pub likes: Vec<AccountId>,
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(owner: AccountId, image_url: ImageUrl, caption: Caption) -> Self {
        let now = Utc::now();
        Self {
            post_id: PostId::new(),
            owner,
            image_url,
            caption,
            likes: Vec::new(),
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        &self.owner == account_id
    }
}
