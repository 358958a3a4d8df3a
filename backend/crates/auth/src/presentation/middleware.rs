//! Auth Middleware
//!
//! `require_auth` gates protected routes; `rate_limit` throttles the
//! credential endpoints per client.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::sync::Arc;

use platform::client::client_key;
use platform::cookie::extract_cookie;
use platform::rate_limit::RateLimitStore;

use crate::application::config::AuthConfig;
use crate::application::{AuthenticateUseCase, TokenService};
use crate::domain::repository::AccountRepository;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Middleware state for the gate
#[derive(Clone)]
pub struct AuthGateState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

/// Authenticate the request, refreshing an expired access token when the
/// refresh cookie allows it.
///
/// On success the identity is stored in request extensions (see
/// [`super::extractor::CurrentAccount`]). A refreshed access token is
/// returned to the client as `Authorization: Bearer <token>`.
pub async fn require_auth<R>(
    State(state): State<AuthGateState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let access = bearer_token(req.headers());
    let refresh = extract_cookie(req.headers(), &state.config.refresh_cookie_name);

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.tokens.clone());
    let outcome = match use_case
        .execute(access.as_deref(), refresh.as_deref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(outcome.identity);
    let mut response = next.run(req).await;

    if let Some(token) = outcome.refreshed_access {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                response.headers_mut().insert(header::AUTHORIZATION, value);
            }
            Err(e) => {
                tracing::error!(error = %e, "Refreshed access token is not a valid header value");
            }
        }
    }

    response
}

/// Fixed-window limit on the credential endpoints, keyed by client IP.
pub async fn rate_limit<R>(
    State(state): State<AuthAppState<R>>,
    req: Request,
    next: Next,
) -> Response
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let key = client_key(req.headers(), direct_ip, state.config.trust_forwarded_for);

    match state
        .limiter
        .check_and_increment(&key, &state.config.rate_limit)
        .await
    {
        Ok(result) if !result.allowed => {
            let mut response = AuthError::RateLimited.into_response();
            if let Ok(value) = HeaderValue::from_str(&result.retry_after.as_secs().to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        Ok(_) => next.run(req).await,
        Err(e) => {
            // Limiter failure must not lock everyone out.
            tracing::error!(error = %e, "Rate limiter unavailable, allowing request");
            next.run(req).await
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
