//! PostgreSQL Repository Implementation
//!
//! Credential columns of the `accounts` table. The social columns of the
//! same row belong to the `social` crate.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{account::Account, otp_challenge::OtpChallenge};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email, otp_code::OtpCode, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    user_name,
    email,
    password_hash,
    role,
    is_verified,
    otp_code,
    otp_issued_at,
    refresh_token_hash,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn select_where(predicate: &str) -> String {
    format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {predicate}")
}

impl AccountRepository for PgAuthRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                user_name,
                email,
                password_hash,
                role,
                is_verified,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.user_name.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.is_verified)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::UserAlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&select_where("account_id = $1"))
            .bind(account_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&select_where("email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> AuthResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM accounts
                WHERE email = $1 OR lower(user_name) = lower($2)
            )
            "#,
        )
        .bind(email.as_str())
        .bind(user_name.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn save_otp(
        &self,
        account_id: &AccountId,
        challenge: Option<&OtpChallenge>,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET otp_code = $2,
                otp_issued_at = $3,
                otp_failed_attempts = 0,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(challenge.map(|c| c.code.as_str()))
        .bind(challenge.map(|c| c.issued_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_otp(&self, account_id: &AccountId, code: &OtpCode) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET otp_code = NULL,
                otp_issued_at = NULL,
                otp_failed_attempts = 0,
                is_verified = TRUE,
                updated_at = now()
            WHERE account_id = $1 AND otp_code = $2
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(code.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_otp_failure(
        &self,
        account_id: &AccountId,
        code: &OtpCode,
        limit: u32,
    ) -> AuthResult<Option<u32>> {
        // SET expressions see the pre-update row.
        let failures: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET otp_failed_attempts = otp_failed_attempts + 1,
                otp_code = CASE WHEN otp_failed_attempts + 1 >= $3 THEN NULL ELSE otp_code END,
                otp_issued_at = CASE WHEN otp_failed_attempts + 1 >= $3 THEN NULL ELSE otp_issued_at END,
                updated_at = now()
            WHERE account_id = $1 AND otp_code = $2
            RETURNING otp_failed_attempts
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(code.as_str())
        .bind(i32::try_from(limit).unwrap_or(i32::MAX))
        .fetch_optional(&self.pool)
        .await?;

        Ok(failures.map(|n| u32::try_from(n).unwrap_or(0)))
    }

    async fn set_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: Option<&str>,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token_hash = $2, updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id_and_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: &str,
    ) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&select_where(
            "account_id = $1 AND refresh_token_hash = $2",
        ))
        .bind(account_id.as_uuid())
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    user_name: String,
    email: String,
    password_hash: String,
    role: i16,
    is_verified: bool,
    otp_code: Option<String>,
    otp_issued_at: Option<DateTime<Utc>>,
    refresh_token_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let otp = match (self.otp_code, self.otp_issued_at) {
            (Some(code), Some(issued_at)) => Some(OtpChallenge {
                code: OtpCode::from_db(code),
                issued_at,
            }),
            _ => None,
        };

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            password_hash: HashedPassword::from_phc_string(self.password_hash)?,
            role: UserRole::from_id(self.role),
            is_verified: self.is_verified,
            otp,
            refresh_token_hash: self.refresh_token_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
