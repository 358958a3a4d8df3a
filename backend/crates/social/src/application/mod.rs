//! Application Layer
//!
//! Use cases and the cache coherence layer.

pub mod cache;
pub mod delete_account;
pub mod follow;
pub mod likes;
pub mod posts;
pub mod profile;

// Re-exports
pub use cache::{CacheKey, ReadThroughCache};
pub use delete_account::DeleteAccountUseCase;
pub use follow::{FollowOutcome, ToggleFollowUseCase};
pub use likes::{LikeOutcome, ListLikesUseCase, ToggleLikeUseCase};
pub use posts::{
    CreatePostInput, CreatePostUseCase, DeletePostUseCase, GetPostUseCase,
    ListAccountPostsUseCase, ListPostsUseCase, PostView, UpdatePostUseCase,
};
pub use profile::{
    AccountListing, GetProfileUseCase, ListAccountsUseCase, ProfileSnapshot,
    UpdateProfileInput, UpdateProfileUseCase,
};
