//! OTP Code Value Object

use rand::Rng;
use std::fmt;

use platform::crypto::constant_time_eq;

pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Six-digit numeric one-time code.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Uniformly random in `[100000, 999999]`.
    pub fn generate() -> Self {
        let n: u32 = rand::rng().random_range(OTP_MIN..=OTP_MAX);
        Self(n.to_string())
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against user input in constant time.
    ///
    /// ## Arguments
    /// * `supplied` - code from the request; surrounding whitespace is ignored
    ///
    /// ## Returns
    /// `true` only for an exact match. Comparison time does not depend on
    /// where the first differing digit is.
    ///
    /// ## Examples
    /// ```rust
    /// use auth::domain::value_object::otp_code::OtpCode;
    ///
    /// let code = OtpCode::from_db("482913");
    /// assert!(code.matches(" 482913"));
    /// assert!(!code.matches("482914"));
    /// ```
    pub fn matches(&self, supplied: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), supplied.trim().as_bytes())
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}
