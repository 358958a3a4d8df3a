//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod extractor;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extractor::CurrentAccount;
pub use handlers::AuthAppState;
pub use middleware::{AuthGateState, rate_limit, require_auth};
pub use router::{AuthComponents, auth_router, auth_router_generic, logout_router};
