//! Post Caption Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SocialError, SocialResult};

pub const CAPTION_MAX_LENGTH: usize = 500;

/// Trimmed, non-empty, at most 500 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Caption(String);

impl Caption {
    pub fn new(raw: &str) -> SocialResult<Self> {
        let caption = raw.trim();
        if caption.is_empty() {
            return Err(SocialError::Validation(
                "Caption and image are required".to_string(),
            ));
        }
        if caption.chars().count() > CAPTION_MAX_LENGTH {
            return Err(SocialError::Validation(format!(
                "Caption must be at most {CAPTION_MAX_LENGTH} characters"
            )));
        }
        Ok(Self(caption.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_bounds() {
        assert_eq!(Caption::new("  sunset  ").unwrap().as_str(), "sunset");
        assert!(Caption::new("   ").is_err());
        assert!(Caption::new(&"a".repeat(500)).is_ok());
        assert!(Caption::new(&"a".repeat(501)).is_err());
        // counted in characters, not bytes
        assert!(Caption::new(&"é".repeat(500)).is_ok());
    }
}
