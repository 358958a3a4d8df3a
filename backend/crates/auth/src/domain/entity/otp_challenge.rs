//! OTP Challenge

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::value_object::otp_code::OtpCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub code: OtpCode,
    pub issued_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            code: OtpCode::generate(),
            issued_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.issued_at);
        age.to_std().map(|age| age > ttl).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let issued = Utc::now();
        let challenge = OtpChallenge::issue(issued);
        let ttl = Duration::from_secs(300);

        assert!(!challenge.is_expired(issued, ttl));
        assert!(!challenge.is_expired(issued + chrono::Duration::seconds(300), ttl));
        assert!(challenge.is_expired(issued + chrono::Duration::seconds(301), ttl));
        // clock skew backwards never expires
        assert!(!challenge.is_expired(issued - chrono::Duration::seconds(10), ttl));
    }
}
