//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::rate_limit::InMemoryRateLimiter;

use crate::application::config::AuthConfig;
use crate::application::{
    IssuedSession, LoginInput, LoginUseCase, LogoutUseCase, OtpDispatcher, RegisterInput,
    RegisterUseCase, TokenService, VerifyOtpInput, VerifyOtpUseCase,
};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountSummary, LoginRequest, MessageResponse, RegisterRequest, SessionResponse,
    VerifyOtpRequest,
};
use crate::presentation::extractor::CurrentAccount;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
    pub dispatcher: OtpDispatcher,
    pub limiter: Arc<InMemoryRateLimiter>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            user_name: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    let cookie = refresh_cookie(&state.config, &output.session)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            success: true,
            message: "User registered successfully.",
            user: AccountSummary::from(&output.account),
            access_token: output.session.access_token,
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.dispatcher.clone(),
        state.config.clone(),
    );

    use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(MessageResponse::ok("OTP sent to your email")))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<VerifyOtpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = VerifyOtpUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(VerifyOtpInput {
            email: req.email,
            otp: req.otp,
        })
        .await?;

    let cookie = refresh_cookie(&state.config, &output.session)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            success: true,
            message: "Login successful",
            user: AccountSummary::from(&output.account),
            access_token: output.session.access_token,
        }),
    ))
}

// ============================================================================
// Logout (behind the gate)
// ============================================================================

/// POST /api/users/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    CurrentAccount(identity): CurrentAccount,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    LogoutUseCase::new(state.repo.clone())
        .execute(&identity.account_id)
        .await?;

    let cookie = state
        .config
        .refresh_cookie()
        .delete_cookie_header()
        .ok_or_else(|| AuthError::Internal("Cookie header encoding failed".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::ok("Logout successful")),
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn refresh_cookie(config: &AuthConfig, session: &IssuedSession) -> AuthResult<HeaderValue> {
    config
        .refresh_cookie()
        .set_cookie_header(&session.refresh_token)
        .ok_or_else(|| AuthError::Internal("Cookie header encoding failed".to_string()))
}
