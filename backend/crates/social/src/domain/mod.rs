//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::post::Post;
pub use entity::profile::{AccountCard, AccountProfile, AccountRemoval, ProfileUpdate};
pub use repository::{AccountGraphRepository, PostRepository, SocialRepository};
