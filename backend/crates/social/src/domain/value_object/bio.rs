//! Profile Bio Value Object

use serde::{Deserialize, Serialize};

use crate::error::{SocialError, SocialResult};

pub const BIO_MAX_LENGTH: usize = 300;

/// Trimmed free text, may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bio(String);

impl Bio {
    pub fn new(raw: &str) -> SocialResult<Self> {
        let bio = raw.trim();
        if bio.chars().count() > BIO_MAX_LENGTH {
            return Err(SocialError::Validation(format!(
                "Bio must be at most {BIO_MAX_LENGTH} characters"
            )));
        }
        if bio.chars().any(|c| c.is_control() && c != '\n') {
            return Err(SocialError::Validation(
                "Bio contains invalid characters".to_string(),
            ));
        }
        Ok(Self(bio.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
