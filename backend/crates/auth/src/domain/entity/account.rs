//! Account Entity
//!
//! Credential side of an account. Social fields (bio, picture, graph)
//! live in the `social` crate over the same row.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::entity::otp_challenge::OtpChallenge;
use crate::domain::value_object::{email::Email, user_name::UserName, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub user_name: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub is_verified: bool,
    /// At most one outstanding challenge.
    pub otp: Option<OtpChallenge>,
    /// SHA-256 fingerprint of the single live refresh token.
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_name: UserName, email: Email, password_hash: HashedPassword) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            user_name,
            email,
            password_hash,
            role: UserRole::default(),
            is_verified: false,
            otp: None,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }
}
