//! Auth Router

use axum::{Router, middleware, routing::post};
use std::sync::Arc;

use platform::rate_limit::InMemoryRateLimiter;

use crate::application::config::AuthConfig;
use crate::application::{OtpDispatcher, TokenService};
use crate::domain::repository::AccountRepository;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthGateState, rate_limit};

/// Everything the auth routers and the gate share.
#[derive(Clone)]
pub struct AuthComponents<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
    pub dispatcher: OtpDispatcher,
}

impl<R> AuthComponents<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig, dispatcher: OtpDispatcher) -> Self {
        let tokens = TokenService::new(&config);
        Self {
            repo: Arc::new(repo),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// State for [`super::middleware::require_auth`].
    pub fn gate(&self) -> AuthGateState<R> {
        AuthGateState {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }

    fn app_state(&self) -> AuthAppState<R> {
        AuthAppState {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
            dispatcher: self.dispatcher.clone(),
            limiter: Arc::new(InMemoryRateLimiter::new()),
        }
    }
}

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(components: &AuthComponents<PgAuthRepository>) -> Router {
    auth_router_generic(components)
}

/// Create a generic Auth router for any repository implementation
///
/// Mounted under `/api/auth`; every route counts against the rate limit.
pub fn auth_router_generic<R>(components: &AuthComponents<R>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let state = components.app_state();

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/verify-otp", post(handlers::verify_otp::<R>))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::<R>))
        .with_state(state)
}

/// `POST /logout`, to be mounted under `/api/users` behind the gate.
pub fn logout_router<R>(components: &AuthComponents<R>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/logout", post(handlers::logout::<R>))
        .with_state(components.app_state())
}
