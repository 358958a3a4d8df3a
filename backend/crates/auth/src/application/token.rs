//! Token Service
//!
//! HS256 access and refresh tokens signed with independent secrets.
//! Access tokens are stateless. Refresh tokens are additionally checked
//! against the fingerprint stored on the account, which makes them revocable.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_role::UserRole;
use crate::error::TokenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AccountId,
    /// Present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Makes two tokens minted in the same second distinct
    pub jti: Uuid,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl KeyPair {
    fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }
}

pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway on expiry.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: KeyPair::new(&config.access_token_secret, config.access_token_ttl),
            refresh: KeyPair::new(&config.refresh_token_secret, config.refresh_token_ttl),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn issue_access_token(
        &self,
        account_id: &AccountId,
        role: UserRole,
    ) -> Result<String, TokenError> {
        self.sign(TokenKind::Access, account_id, Some(role), Utc::now().timestamp())
    }

    /// The caller persists the fingerprint, replacing any previous session.
    pub fn issue_refresh_token(&self, account_id: &AccountId) -> Result<String, TokenError> {
        self.sign(TokenKind::Refresh, account_id, None, Utc::now().timestamp())
    }

    /// Sign with an explicit issue time; expiry follows from the kind's TTL.
    pub(crate) fn sign(
        &self,
        kind: TokenKind,
        account_id: &AccountId,
        role: Option<UserRole>,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let claims = Claims {
            sub: *account_id,
            role,
            typ: kind,
            iat: issued_at,
            exp: issued_at.saturating_add(keys.ttl_secs),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation).map_err(
            |e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            },
        )?;

        // A refresh token must never pass as an access token and vice versa.
        if data.claims.typ != kind {
            return Err(TokenError::Malformed);
        }

        Ok(data.claims)
    }
}
