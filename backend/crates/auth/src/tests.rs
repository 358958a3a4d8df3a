//! Use case tests against an in-memory credential store.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use chrono::Utc;
use kernel::id::AccountId;
use platform::mail::{MailError, Mailer, OutgoingMail};
use tokio::sync::mpsc;
use tower::ServiceExt;

use crate::application::otp::MAX_OTP_ATTEMPTS;
use crate::application::session::{refresh_fingerprint, start_session};
use crate::application::{
    AuthConfig, AuthenticateUseCase, LoginInput, LoginUseCase, LogoutUseCase,
    OtpChallengeManager, OtpDispatcher, OtpDispatcherConfig, RegisterInput, RegisterOutput,
    RegisterUseCase, TokenKind, TokenService, VerifyOtpInput, VerifyOtpUseCase,
};
use crate::domain::entity::{account::Account, otp_challenge::OtpChallenge};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email, otp_code::OtpCode, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult, OtpError};
use crate::presentation::middleware::require_auth;
use crate::presentation::{AuthComponents, CurrentAccount, auth_router_generic};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Clone, Default)]
struct InMemoryAccounts {
    accounts: Arc<Mutex<HashMap<AccountId, Account>>>,
    otp_failures: Arc<Mutex<HashMap<AccountId, u32>>>,
}

impl InMemoryAccounts {
    fn get(&self, id: &AccountId) -> Option<Account> {
        self.accounts.lock().unwrap().get(id).cloned()
    }

    fn update(&self, id: &AccountId, f: impl FnOnce(&mut Account)) {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(id) {
            f(account);
        }
    }
}

impl AccountRepository for InMemoryAccounts {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let taken = accounts.values().any(|a| {
            a.email == account.email
                || a.user_name.as_str().eq_ignore_ascii_case(account.user_name.as_str())
        });
        if taken {
            return Err(AuthError::UserAlreadyExists);
        }
        accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.get(account_id))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.values().find(|a| &a.email == email).cloned())
    }

    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> AuthResult<bool> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.values().any(|a| {
            &a.email == email || a.user_name.as_str().eq_ignore_ascii_case(user_name.as_str())
        }))
    }

    async fn save_otp(
        &self,
        account_id: &AccountId,
        challenge: Option<&OtpChallenge>,
    ) -> AuthResult<()> {
        self.update(account_id, |a| a.otp = challenge.cloned());
        self.otp_failures.lock().unwrap().remove(account_id);
        Ok(())
    }

    async fn consume_otp(&self, account_id: &AccountId, code: &OtpCode) -> AuthResult<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(account_id) {
            Some(a) if a.otp.as_ref().map(|c| &c.code) == Some(code) => {
                a.otp = None;
                a.is_verified = true;
                self.otp_failures.lock().unwrap().remove(account_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_otp_failure(
        &self,
        account_id: &AccountId,
        code: &OtpCode,
        limit: u32,
    ) -> AuthResult<Option<u32>> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get_mut(account_id) else {
            return Ok(None);
        };
        if account.otp.as_ref().map(|c| &c.code) != Some(code) {
            return Ok(None);
        }

        let mut failures = self.otp_failures.lock().unwrap();
        let count = failures.entry(*account_id).or_insert(0);
        *count += 1;
        if *count >= limit {
            account.otp = None;
        }
        Ok(Some(*count))
    }

    async fn set_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: Option<&str>,
    ) -> AuthResult<()> {
        self.update(account_id, |a| a.refresh_token_hash = token_hash.map(str::to_string));
        Ok(())
    }

    async fn find_by_id_and_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: &str,
    ) -> AuthResult<Option<Account>> {
        Ok(self
            .get(account_id)
            .filter(|a| a.refresh_token_hash.as_deref() == Some(token_hash)))
    }
}

/// Forwards every delivered mail to the test.
struct ChannelMailer {
    tx: mpsc::UnboundedSender<OutgoingMail>,
}

impl Mailer for ChannelMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let _ = self.tx.send(mail.clone());
        Ok(())
    }
}

struct Harness {
    repo: Arc<InMemoryAccounts>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
    dispatcher: OtpDispatcher,
    mails: mpsc::UnboundedReceiver<OutgoingMail>,
}

fn harness() -> Harness {
    let config = AuthConfig::development();
    let (tx, mails) = mpsc::unbounded_channel();
    let dispatcher = OtpDispatcher::spawn(
        Arc::new(ChannelMailer { tx }),
        OtpDispatcherConfig {
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        },
    );

    Harness {
        repo: Arc::new(InMemoryAccounts::default()),
        tokens: Arc::new(TokenService::new(&config)),
        config: Arc::new(config),
        dispatcher,
        mails,
    }
}

impl Harness {
    async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<RegisterOutput> {
        RegisterUseCase::new(self.repo.clone(), self.tokens.clone(), self.config.clone())
            .execute(RegisterInput {
                user_name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    async fn login(&self, email: &str, password: &str) -> AuthResult<()> {
        LoginUseCase::new(self.repo.clone(), self.dispatcher.clone(), self.config.clone())
            .execute(LoginInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    async fn verify(&self, email: &str, otp: &str) -> AuthResult<crate::application::VerifyOtpOutput> {
        VerifyOtpUseCase::new(self.repo.clone(), self.tokens.clone(), self.config.clone())
            .execute(VerifyOtpInput {
                email: email.to_string(),
                otp: otp.to_string(),
            })
            .await
    }

    fn gate(&self) -> AuthenticateUseCase<InMemoryAccounts> {
        AuthenticateUseCase::new(self.repo.clone(), self.tokens.clone())
    }

    fn expired_access(&self, id: &AccountId) -> String {
        let two_hours_ago = Utc::now().timestamp() - 7200;
        self.tokens
            .sign(TokenKind::Access, id, Some(UserRole::User), two_hours_ago)
            .unwrap()
    }
}

const PASSWORD: &str = "correct horse battery";

// ============================================================================
// Registration and login
// ============================================================================

#[tokio::test]
async fn test_register_never_stores_plaintext() {
    let h = harness();
    let out = h.register("alice", "Alice@Example.com", PASSWORD).await.unwrap();

    let stored = h
        .repo
        .find_by_email(&Email::new("alice@example.com").unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.account_id, out.account.account_id);
    assert_ne!(stored.password_hash.as_phc_string(), PASSWORD);
    assert!(stored.password_hash.as_phc_string().starts_with("$argon2id$"));

    // the refresh token itself is never stored
    let fingerprint = stored.refresh_token_hash.unwrap();
    assert_ne!(fingerprint, out.session.refresh_token);
    assert_eq!(fingerprint, refresh_fingerprint(&out.session.refresh_token));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let h = harness();
    h.register("alice", "alice@example.com", PASSWORD).await.unwrap();

    let dup_email = h.register("alice2", "ALICE@example.com", PASSWORD).await;
    assert!(matches!(dup_email, Err(AuthError::UserAlreadyExists)));

    let dup_name = h.register("Alice", "other@example.com", PASSWORD).await;
    assert!(matches!(dup_name, Err(AuthError::UserAlreadyExists)));

    let short_pw = h.register("bob", "bob@example.com", "short").await;
    assert!(matches!(short_pw, Err(AuthError::Validation(_))));

    let bad_name = h.register("b", "bob@example.com", PASSWORD).await;
    assert!(matches!(bad_name, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    h.register("alice", "alice@example.com", PASSWORD).await.unwrap();

    let wrong_password = h.login("alice@example.com", "not the password").await.unwrap_err();
    let unknown_email = h.login("nobody@example.com", PASSWORD).await.unwrap_err();
    let malformed_email = h.login("nobody", PASSWORD).await.unwrap_err();

    assert_eq!(wrong_password.to_string(), "Invalid email or password");
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.to_string(), malformed_email.to_string());
    assert_eq!(wrong_password.status_code(), unknown_email.status_code());
}

#[tokio::test]
async fn test_login_mails_code_without_issuing_tokens() {
    let mut h = harness();
    let out = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let fingerprint_before = h.repo.get(&out.account.account_id).unwrap().refresh_token_hash;

    h.login("alice@example.com", PASSWORD).await.unwrap();

    let mail = tokio::time::timeout(Duration::from_secs(5), h.mails.recv())
        .await
        .unwrap()
        .unwrap();
    let stored = h.repo.get(&out.account.account_id).unwrap();
    let code = stored.otp.unwrap().code;

    assert_eq!(mail.to, "alice@example.com");
    assert_eq!(mail.subject, "Your OTP Code");
    assert!(mail.text.contains(code.as_str()));
    assert_eq!(stored.refresh_token_hash, fingerprint_before);
}

// ============================================================================
// OTP
// ============================================================================

#[tokio::test]
async fn test_otp_is_single_use() {
    let mut h = harness();
    h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    h.login("alice@example.com", PASSWORD).await.unwrap();
    let mail = h.mails.recv().await.unwrap();
    let code: String = mail.text.chars().filter(char::is_ascii_digit).take(6).collect();

    let out = h.verify("alice@example.com", &code).await.unwrap();
    assert!(out.account.is_verified);
    assert!(h.repo.get(&out.account.account_id).unwrap().otp.is_none());

    let again = h.verify("alice@example.com", &code).await;
    assert!(matches!(again, Err(AuthError::Otp(OtpError::NoActiveChallenge))));
}

#[tokio::test]
async fn test_otp_mismatch_keeps_challenge() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let bob = h.register("bob", "bob@example.com", PASSWORD).await.unwrap();

    let challenge = |code: &str| OtpChallenge {
        code: OtpCode::from_db(code),
        issued_at: Utc::now(),
    };
    h.repo
        .save_otp(&alice.account.account_id, Some(&challenge("111111")))
        .await
        .unwrap();
    h.repo
        .save_otp(&bob.account.account_id, Some(&challenge("222222")))
        .await
        .unwrap();

    // bob's code does not open alice's account
    let wrong = h.verify("alice@example.com", "222222").await;
    assert!(matches!(wrong, Err(AuthError::Otp(OtpError::Mismatch))));
    assert!(h.repo.get(&alice.account.account_id).unwrap().otp.is_some());

    assert!(h.verify("alice@example.com", "111111").await.is_ok());
}

#[tokio::test]
async fn test_otp_discarded_after_repeated_mismatches() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let id = alice.account.account_id;
    h.repo
        .save_otp(
            &id,
            Some(&OtpChallenge {
                code: OtpCode::from_db("111111"),
                issued_at: Utc::now(),
            }),
        )
        .await
        .unwrap();

    for guess in 0..MAX_OTP_ATTEMPTS - 1 {
        let wrong = h.verify("alice@example.com", &format!("{:06}", 200_000 + guess)).await;
        assert!(matches!(wrong, Err(AuthError::Otp(OtpError::Mismatch))));
    }

    let last = h.verify("alice@example.com", "999999").await;
    assert!(matches!(last, Err(AuthError::Otp(OtpError::AttemptsExhausted))));
    assert!(h.repo.get(&id).unwrap().otp.is_none());

    // even the right code is useless now
    let late = h.verify("alice@example.com", "111111").await;
    assert!(matches!(late, Err(AuthError::Otp(OtpError::NoActiveChallenge))));
}

#[tokio::test]
async fn test_otp_expired_is_cleared() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let manager = OtpChallengeManager::new(h.repo.clone(), h.config.otp_ttl);

    let account = h.repo.get(&alice.account.account_id).unwrap();
    let code = manager.issue(&account).await.unwrap();
    let account = h.repo.get(&alice.account.account_id).unwrap();

    let late = Utc::now() + chrono::Duration::seconds(301);
    let result = manager.verify_at(&account, code.as_str(), late).await;

    assert!(matches!(result, Err(AuthError::Otp(OtpError::Expired))));
    assert!(h.repo.get(&alice.account.account_id).unwrap().otp.is_none());
}

#[tokio::test]
async fn test_otp_for_unknown_account() {
    let h = harness();
    let result = h.verify("ghost@example.com", "123456").await;
    assert!(matches!(result, Err(AuthError::Otp(OtpError::NoActiveChallenge))));
}

#[tokio::test]
async fn test_new_login_supersedes_previous_code() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let manager = OtpChallengeManager::new(h.repo.clone(), h.config.otp_ttl);

    h.repo
        .save_otp(
            &alice.account.account_id,
            Some(&OtpChallenge {
                code: OtpCode::from_db("111111"),
                issued_at: Utc::now(),
            }),
        )
        .await
        .unwrap();

    let account = h.repo.get(&alice.account.account_id).unwrap();
    let fresh = manager.issue(&account).await.unwrap();
    let stored = h.repo.get(&alice.account.account_id).unwrap().otp.unwrap();
    assert_eq!(stored.code, fresh);
}

// ============================================================================
// Auth gate
// ============================================================================

#[tokio::test]
async fn test_gate_valid_access() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();

    let outcome = h
        .gate()
        .execute(Some(&alice.session.access_token), None)
        .await
        .unwrap();

    assert_eq!(outcome.identity.account_id, alice.account.account_id);
    assert_eq!(outcome.identity.role, UserRole::User);
    assert!(outcome.refreshed_access.is_none());
}

#[tokio::test]
async fn test_gate_rejections() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let id = alice.account.account_id;
    let expired = h.expired_access(&id);

    let missing = h.gate().execute(None, Some(&alice.session.refresh_token)).await;
    assert!(matches!(missing, Err(AuthError::MissingAccessToken)));

    // tampered tokens never reach the refresh path
    let forged = h
        .gate()
        .execute(Some("abc.def.ghi"), Some(&alice.session.refresh_token))
        .await;
    assert!(matches!(forged, Err(AuthError::InvalidAccessToken)));

    let no_cookie = h.gate().execute(Some(&expired), None).await;
    assert!(matches!(no_cookie, Err(AuthError::MissingRefreshToken)));

    let bad_refresh = h.gate().execute(Some(&expired), Some("garbage")).await;
    assert!(matches!(bad_refresh, Err(AuthError::InvalidRefreshToken)));

    // an access token is not a refresh token
    let wrong_kind = h
        .gate()
        .execute(Some(&expired), Some(&alice.session.access_token))
        .await;
    assert!(matches!(wrong_kind, Err(AuthError::InvalidRefreshToken)));
}

#[tokio::test]
async fn test_gate_silent_refresh() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let id = alice.account.account_id;
    let fingerprint_before = h.repo.get(&id).unwrap().refresh_token_hash;

    let outcome = h
        .gate()
        .execute(Some(&h.expired_access(&id)), Some(&alice.session.refresh_token))
        .await
        .unwrap();

    assert_eq!(outcome.identity.account_id, id);
    let fresh = outcome.refreshed_access.unwrap();
    let claims = h.tokens.verify(&fresh, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, id);

    // refresh token is reused, nothing persisted
    assert_eq!(h.repo.get(&id).unwrap().refresh_token_hash, fingerprint_before);
}

#[tokio::test]
async fn test_gate_rejects_superseded_refresh_token() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let id = alice.account.account_id;

    // a second sign-in elsewhere replaces the stored token
    start_session(&*h.repo, &h.tokens, &id, UserRole::User)
        .await
        .unwrap();

    let result = h
        .gate()
        .execute(Some(&h.expired_access(&id)), Some(&alice.session.refresh_token))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AuthError::SessionRevoked));
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_revokes_refresh() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let id = alice.account.account_id;

    LogoutUseCase::new(h.repo.clone()).execute(&id).await.unwrap();
    assert!(h.repo.get(&id).unwrap().refresh_token_hash.is_none());

    let result = h
        .gate()
        .execute(Some(&h.expired_access(&id)), Some(&alice.session.refresh_token))
        .await;
    assert!(matches!(result, Err(AuthError::SessionRevoked)));
}

// ============================================================================
// HTTP
// ============================================================================

fn components(h: &Harness) -> AuthComponents<InMemoryAccounts> {
    AuthComponents {
        repo: h.repo.clone(),
        tokens: h.tokens.clone(),
        config: h.config.clone(),
        dispatcher: h.dispatcher.clone(),
    }
}

async fn whoami(CurrentAccount(me): CurrentAccount) -> String {
    me.account_id.to_string()
}

fn protected_app(h: &Harness) -> Router {
    Router::new().route("/me", get(whoami)).route_layer(
        axum::middleware::from_fn_with_state(
            components(h).gate(),
            require_auth::<InMemoryAccounts>,
        ),
    )
}

#[tokio::test]
async fn test_middleware_surfaces_refreshed_token() {
    let h = harness();
    let alice = h.register("alice", "alice@example.com", PASSWORD).await.unwrap();
    let id = alice.account.account_id;

    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", h.expired_access(&id)))
        .header(
            header::COOKIE,
            format!("refreshToken={}", alice.session.refresh_token),
        )
        .body(Body::empty())
        .unwrap();

    let response = protected_app(&h).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let new_header = response
        .headers()
        .get(header::AUTHORIZATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let new_token = new_header.strip_prefix("Bearer ").unwrap();
    assert!(h.tokens.verify(new_token, TokenKind::Access).is_ok());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, id.to_string().as_bytes());
}

#[tokio::test]
async fn test_middleware_rejects_without_token() {
    let h = harness();
    let request = Request::builder().uri("/me").body(Body::empty()).unwrap();

    let response = protected_app(&h).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::AUTHORIZATION).is_none());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Unauthorized: No access token provided");
}

#[tokio::test]
async fn test_credential_routes_are_rate_limited() {
    let h = harness();
    let app = auth_router_generic(&components(&h));

    let attempt = || {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(
                r#"{"username":"x","email":"not-an-email","password":"short"}"#,
            ))
            .unwrap()
    };

    for _ in 0..5 {
        let response = app.clone().oneshot(attempt()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app.clone().oneshot(attempt()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get(header::RETRY_AFTER).is_some());
}

#[tokio::test]
async fn test_rate_limit_ignores_spoofed_forwarded_for() {
    let h = harness();
    let app = auth_router_generic(&components(&h));
    let peer: SocketAddr = "198.51.100.20:51000".parse().unwrap();

    let attempt = |i: u32| {
        let mut request = Request::builder()
            .method("POST")
            .uri("/verify-otp")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", format!("203.0.113.{i}"))
            .body(Body::from(r#"{"email":"nobody@example.com","otp":"123456"}"#))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    };

    for i in 0..5 {
        let response = app.clone().oneshot(attempt(i)).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let response = app.clone().oneshot(attempt(99)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
