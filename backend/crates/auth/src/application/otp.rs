//! OTP Challenge Manager
//!
//! Issues and checks the six-digit second factor. Delivery goes through
//! [`OtpDispatcher`], a background worker, so mail latency never reaches
//! the login response.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::mail::{Mailer, OutgoingMail};
use tokio::sync::mpsc;

use crate::domain::entity::{account::Account, otp_challenge::OtpChallenge};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::domain::value_object::otp_code::OtpCode;
use crate::error::{AuthError, AuthResult, OtpError};

pub const OTP_MAIL_SUBJECT: &str = "Your OTP Code";

/// Wrong guesses tolerated per challenge before it is discarded.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

pub struct OtpChallengeManager<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    ttl: Duration,
}

impl<R> OtpChallengeManager<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    /// Store a fresh code on the account, superseding any outstanding one.
    pub async fn issue(&self, account: &Account) -> AuthResult<OtpCode> {
        let challenge = OtpChallenge::issue(Utc::now());
        self.repo
            .save_otp(&account.account_id, Some(&challenge))
            .await?;

        tracing::debug!(account_id = %account.account_id, "OTP issued");
        Ok(challenge.code)
    }

    /// Check `supplied` against the account's challenge and consume it.
    pub async fn verify(&self, account: &Account, supplied: &str) -> AuthResult<()> {
        self.verify_at(account, supplied, Utc::now()).await
    }

    pub(crate) async fn verify_at(
        &self,
        account: &Account,
        supplied: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        let challenge = account.otp.as_ref().ok_or(OtpError::NoActiveChallenge)?;

        if challenge.is_expired(now, self.ttl) {
            self.repo.save_otp(&account.account_id, None).await?;
            return Err(OtpError::Expired.into());
        }

        if !challenge.code.matches(supplied) {
            let failures = self
                .repo
                .record_otp_failure(&account.account_id, &challenge.code, MAX_OTP_ATTEMPTS)
                .await?;
            return match failures {
                Some(n) if n >= MAX_OTP_ATTEMPTS => {
                    tracing::warn!(account_id = %account.account_id, "OTP discarded after repeated mismatches");
                    Err(OtpError::AttemptsExhausted.into())
                }
                _ => Err(OtpError::Mismatch.into()),
            };
        }

        // Guarded clear: a concurrent verify with the same code loses here.
        if !self
            .repo
            .consume_otp(&account.account_id, &challenge.code)
            .await?
        {
            return Err(OtpError::NoActiveChallenge.into());
        }

        Ok(())
    }
}

// ============================================================================
// Delivery
// ============================================================================

#[derive(Debug, Clone)]
pub struct OtpDispatcherConfig {
    pub from: String,
    pub queue_capacity: usize,
    pub retry_delay: Duration,
}

impl Default for OtpDispatcherConfig {
    fn default() -> Self {
        Self {
            from: "no-reply@localhost".to_string(),
            queue_capacity: 256,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Handle to the mail worker. Cheap to clone.
#[derive(Clone)]
pub struct OtpDispatcher {
    tx: mpsc::Sender<OutgoingMail>,
    from: String,
}

impl OtpDispatcher {
    /// Spawn the worker on the current runtime.
    ///
    /// Each mail is attempted twice at most; the second failure is logged.
    pub fn spawn<M>(mailer: Arc<M>, config: OtpDispatcherConfig) -> Self
    where
        M: Mailer + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<OutgoingMail>(config.queue_capacity.max(1));
        let retry_delay = config.retry_delay;

        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                if let Err(first) = mailer.send(&mail).await {
                    tracing::warn!(to = %mail.to, error = %first, "OTP mail failed, retrying once");
                    tokio::time::sleep(retry_delay).await;

                    if let Err(second) = mailer.send(&mail).await {
                        tracing::error!(to = %mail.to, error = %second, "OTP mail dropped after retry");
                    }
                }
            }
            tracing::debug!("OTP mail worker stopped");
        });

        Self {
            tx,
            from: config.from,
        }
    }

    /// Queue the code for delivery without waiting for the transport.
    pub fn dispatch(&self, to: &Email, code: &OtpCode) -> AuthResult<()> {
        let mail = OutgoingMail {
            from: self.from.clone(),
            to: to.as_str().to_string(),
            subject: OTP_MAIL_SUBJECT.to_string(),
            text: format!("Your OTP is {}. It expires in 5 minutes.", code.as_str()),
        };

        self.tx.try_send(mail).map_err(|e| {
            tracing::error!(error = %e, "OTP mail queue rejected message");
            AuthError::MailUnavailable
        })
    }
}
