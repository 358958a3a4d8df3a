//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::SocialAppState;
pub use router::{
    SocialRoutes, posts_router, posts_router_generic, social_state, users_router,
    users_router_generic,
};
