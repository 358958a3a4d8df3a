//! User Name Value Object
//!
//! Public handle shown next to posts and on profiles.
//!
//! - NFKC-normalized and trimmed before validation
//! - 3 to 20 characters
//! - letters, digits, `_`, `.` and `-` only

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::error::AuthError;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 20;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Length { length: usize },
    InvalidCharacter { char: char },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { .. } => write!(
                f,
                "Username must be {USER_NAME_MIN_LENGTH}-{USER_NAME_MAX_LENGTH} characters long"
            ),
            Self::InvalidCharacter { char } => {
                write!(f, "Username cannot contain '{char}'")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Normalize and validate a user name.
    ///
    /// ## Arguments
    /// * `raw` - name as typed, before NFKC normalization and trimming
    ///
    /// ## Returns
    /// The normalized name, or the first rule it breaks
    ///
    /// ## Examples
    /// ```rust
    /// use auth::UserName;
    ///
    /// let name = UserName::new("  ｊｏｈｎ_doe ").unwrap();
    /// assert_eq!(name.as_str(), "john_doe");
    /// assert!(UserName::new("ab").is_err());
    /// assert!(UserName::new("no spaces").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, UserNameError> {
        let normalized: String = raw.nfkc().collect();
        let normalized = normalized.trim();

        let length = normalized.chars().count();
        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&length) {
            return Err(UserNameError::Length { length });
        }

        if let Some(char) = normalized
            .chars()
            .find(|c| !c.is_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(c))
        {
            return Err(UserNameError::InvalidCharacter { char });
        }

        Ok(Self(normalized.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert!(UserName::new("ab").is_err());
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new(&"a".repeat(20)).is_ok());
        assert!(matches!(
            UserName::new(&"a".repeat(21)),
            Err(UserNameError::Length { length: 21 })
        ));
    }

    #[test]
    fn test_trimmed_and_normalized() {
        assert_eq!(UserName::new("  alice  ").unwrap().as_str(), "alice");
        // full-width letters fold to ASCII under NFKC
        assert_eq!(UserName::new("ａｌｉｃｅ").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            UserName::new("ali ce"),
            Err(UserNameError::InvalidCharacter { char: ' ' })
        ));
        assert!(UserName::new("bob<script>").is_err());
        assert!(UserName::new("dev_ops.team-1").is_ok());
    }
}
