//! Authenticate Use Case (Auth Gate)
//!
//! Per-request decision over the bearer access token and the refresh cookie:
//!
//! | access token          | outcome                                        |
//! |-----------------------|------------------------------------------------|
//! | absent                | `MissingAccessToken` (401)                     |
//! | valid                 | proceed                                        |
//! | expired               | silent refresh (below)                         |
//! | malformed / forged    | `InvalidAccessToken` (401), no refresh attempt |
//!
//! Silent refresh: no cookie is 401, a refresh token failing verification
//! is 403, a token that is no longer the stored one is 403, otherwise a new
//! access token is minted. The refresh token itself is not rotated and
//! nothing is written.

use std::sync::Arc;

use kernel::id::AccountId;
use serde::Serialize;

use crate::application::session::refresh_fingerprint;
use crate::application::token::{TokenKind, TokenService};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult, TokenError};

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub identity: AuthenticatedAccount,
    /// Set when the access token was refreshed; the caller must surface it.
    pub refreshed_access: Option<String>,
}

pub struct AuthenticateUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> AuthenticateUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> AuthResult<GateOutcome> {
        let access_token = access_token.ok_or(AuthError::MissingAccessToken)?;

        match self.tokens.verify(access_token, TokenKind::Access) {
            Ok(claims) => Ok(GateOutcome {
                identity: AuthenticatedAccount {
                    account_id: claims.sub,
                    role: claims.role.unwrap_or_default(),
                },
                refreshed_access: None,
            }),
            Err(TokenError::Expired) => self.refresh(refresh_token).await,
            Err(e) => {
                tracing::debug!(error = %e, "Access token rejected");
                Err(AuthError::InvalidAccessToken)
            }
        }
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> AuthResult<GateOutcome> {
        let refresh_token = refresh_token.ok_or(AuthError::MissingRefreshToken)?;

        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;

        // Rotated or revoked elsewhere: the stored fingerprint no longer matches.
        let account = self
            .repo
            .find_by_id_and_refresh_token(&claims.sub, &refresh_fingerprint(refresh_token))
            .await?
            .ok_or(AuthError::SessionRevoked)?;

        let access = self
            .tokens
            .issue_access_token(&account.account_id, account.role)?;

        tracing::debug!(account_id = %account.account_id, "Access token refreshed");

        Ok(GateOutcome {
            identity: AuthenticatedAccount {
                account_id: account.account_id,
                role: account.role,
            },
            refreshed_access: Some(access),
        })
    }
}
