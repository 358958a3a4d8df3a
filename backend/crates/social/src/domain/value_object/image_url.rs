//! Image URL Value Object
//!
//! Images are uploaded elsewhere; only the resulting URL is stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{SocialError, SocialResult};

const IMAGE_URL_MAX_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Absolute `http` or `https` URL.
    pub fn new(raw: &str) -> SocialResult<Self> {
        let raw = raw.trim();
        let invalid = || SocialError::Validation("Invalid image URL".to_string());

        if raw.is_empty() || raw.len() > IMAGE_URL_MAX_LENGTH {
            return Err(invalid());
        }

        let url = Url::parse(raw).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }

        Ok(Self(url.into()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        assert!(ImageUrl::new("https://cdn.example.com/p/1.jpg").is_ok());
        assert!(ImageUrl::new("http://localhost:9000/x.png").is_ok());
        assert!(ImageUrl::new("javascript:alert(1)").is_err());
        assert!(ImageUrl::new("data:image/png;base64,AAAA").is_err());
        assert!(ImageUrl::new("/relative.jpg").is_err());
        assert!(ImageUrl::new("").is_err());
    }
}
