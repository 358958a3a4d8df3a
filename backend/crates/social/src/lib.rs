//! Social Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Profile and post entities, value objects, repository traits
//! - `application/` - Use cases and the read-through cache
//! - `infra/` - Database implementation
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Consistency
//! - The store is authoritative; cache entries are JSON snapshots with a TTL
//! - Every mutation deletes the keys whose snapshots it would stale, after
//!   the store write succeeds
//! - Follow and like toggles are guarded set updates, never whole-array writes
//! - Deleting an account removes its posts, its likes and its graph edges

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{CacheKey, ReadThroughCache};
pub use error::{SocialError, SocialResult};
pub use infra::postgres::PgSocialRepository;
pub use presentation::router::{SocialRoutes, posts_router, social_state, users_router};
