//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::config::{self as env, ConfigError};
use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for access tokens
    pub access_token_secret: Vec<u8>,
    /// HMAC key for refresh tokens, independent of the access key
    pub refresh_token_secret: Vec<u8>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Window in which an issued OTP is accepted
    pub otp_ttl: Duration,
    pub refresh_cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Budget for register/login/verify-otp per client IP
    pub rate_limit: RateLimitConfig,
    /// Key the limiter on `X-Forwarded-For`; only safe behind a proxy that sets it
    pub trust_forwarded_for: bool,
    /// Sender address on OTP mail
    pub mail_from: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: Vec::new(),
            refresh_token_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            otp_ttl: Duration::from_secs(5 * 60),
            refresh_cookie_name: "refreshToken".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            password_pepper: None,
            rate_limit: RateLimitConfig::default(),
            trust_forwarded_for: false,
            mail_from: "no-reply@localhost".to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("otp_ttl", &self.otp_ttl)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[SET]"))
            .field("rate_limit", &self.rate_limit)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .field("mail_from", &self.mail_from)
            .finish_non_exhaustive()
    }
}

fn random_secret() -> Vec<u8> {
    use rand::RngCore;
    let mut secret = vec![0u8; 32];
    rand::rng().fill_bytes(&mut secret);
    secret
}

impl AuthConfig {
    /// Create config with random token secrets (for development)
    pub fn with_random_secret() -> Self {
        Self {
            access_token_secret: random_secret(),
            refresh_token_secret: random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Build from environment.
    ///
    /// Debug builds fall back to random secrets (sessions do not survive a
    /// restart); release builds refuse to start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::default()
        };

        let secret = |key: &'static str, fallback: Vec<u8>| -> Result<Vec<u8>, ConfigError> {
            match env::optional(key) {
                Some(value) => Ok(value.into_bytes()),
                None if cfg!(debug_assertions) => {
                    tracing::warn!(key, "Secret not set, using a random development value");
                    Ok(fallback)
                }
                None => Err(ConfigError::Missing(key)),
            }
        };

        let config = Self {
            access_token_secret: secret("JWT_SECRET", defaults.access_token_secret.clone())?,
            refresh_token_secret: secret(
                "JWT_REFRESH_SECRET",
                defaults.refresh_token_secret.clone(),
            )?,
            access_token_ttl: env::duration_secs("JWT_EXPIRES_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: env::duration_secs(
                "JWT_REFRESH_EXPIRES_SECS",
                defaults.refresh_token_ttl,
            )?,
            otp_ttl: env::duration_secs("OTP_TTL_SECS", defaults.otp_ttl)?,
            cookie_secure: env::flag("COOKIE_SECURE", defaults.cookie_secure)?,
            trust_forwarded_for: env::flag("TRUST_PROXY", defaults.trust_forwarded_for)?,
            password_pepper: env::optional("PASSWORD_PEPPER").map(String::into_bytes),
            mail_from: env::optional("MAIL_FROM").unwrap_or(defaults.mail_from.clone()),
            ..defaults
        };

        if config.access_token_secret == config.refresh_token_secret {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_SECRET",
                reason: "must differ from JWT_SECRET".to_string(),
            });
        }

        Ok(config)
    }

    /// Attributes of the refresh token cookie
    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            ..CookieConfig::new(self.refresh_cookie_name.clone(), self.refresh_token_ttl)
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(604_800));
        assert_eq!(config.otp_ttl, Duration::from_secs(300));
        assert_eq!(config.refresh_cookie_name, "refreshToken");
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_development_secrets_are_distinct() {
        let config = AuthConfig::development();
        assert_eq!(config.access_token_secret.len(), 32);
        assert_ne!(config.access_token_secret, config.refresh_token_secret);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_refresh_cookie_follows_config() {
        let config = AuthConfig::development();
        let cookie = config.refresh_cookie().build_set_cookie("t");
        assert!(cookie.starts_with("refreshToken=t"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = AuthConfig::development();
        let out = format!("{config:?}");
        assert!(!out.contains("access_token_secret"));
    }
}
