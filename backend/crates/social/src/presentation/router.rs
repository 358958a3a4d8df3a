//! Social Routers

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use platform::cache::{CacheBackend, CacheStore};

use crate::application::ReadThroughCache;
use crate::domain::repository::SocialRepository;
use crate::infra::postgres::PgSocialRepository;
use crate::presentation::handlers::{self, SocialAppState};

/// Routes split by whether they sit behind the auth gate. The caller adds
/// the gate to `protected` with `route_layer` and merges both.
pub struct SocialRoutes {
    pub public: Router,
    pub protected: Router,
}

impl SocialRoutes {
    /// Merge both halves, wrapping `protected` with `gate`.
    pub fn into_router<F>(self, gate: F) -> Router
    where
        F: FnOnce(Router) -> Router,
    {
        self.public.merge(gate(self.protected))
    }
}

/// Create the state shared by both social routers.
pub fn social_state<R, C>(repo: R, cache: Arc<C>) -> SocialAppState<R, C>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    SocialAppState {
        repo: Arc::new(repo),
        cache: ReadThroughCache::new(cache),
    }
}

/// Users router with PostgreSQL repository, mounted under `/api/users`
pub fn users_router(state: &SocialAppState<PgSocialRepository, CacheBackend>) -> SocialRoutes {
    users_router_generic(state)
}

/// Posts router with PostgreSQL repository, mounted under `/api/posts`
pub fn posts_router(state: &SocialAppState<PgSocialRepository, CacheBackend>) -> SocialRoutes {
    posts_router_generic(state)
}

pub fn users_router_generic<R, C>(state: &SocialAppState<R, C>) -> SocialRoutes
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let public = Router::new()
        .route("/allUsers", get(handlers::list_accounts::<R, C>))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/profile", get(handlers::own_profile::<R, C>))
        .route("/update-profile", post(handlers::update_profile::<R, C>))
        .route("/follow/{userId}", post(handlers::toggle_follow::<R, C>))
        .route("/posts/{userId}", get(handlers::account_posts::<R, C>))
        .route(
            "/delete-account/{userId}",
            delete(handlers::delete_account::<R, C>),
        )
        .route("/{id}", get(handlers::profile::<R, C>))
        .with_state(state.clone());

    SocialRoutes { public, protected }
}

pub fn posts_router_generic<R, C>(state: &SocialAppState<R, C>) -> SocialRoutes
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let public = Router::new()
        .route("/Allposts", get(handlers::list_posts::<R, C>))
        .route("/post/{postId}", get(handlers::get_post::<R, C>))
        .route("/allLikes/{postId}", get(handlers::list_likes::<R, C>))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/create", post(handlers::create_post::<R, C>))
        .route("/like/{postId}", post(handlers::toggle_like::<R, C>))
        .route("/update/{postId}", put(handlers::update_post::<R, C>))
        .route("/delete/{postId}", delete(handlers::delete_post::<R, C>))
        .with_state(state.clone());

    SocialRoutes { public, protected }
}
