//! Cookie Management Infrastructure
//!
//! Building and reading the HttpOnly cookies that carry long-lived tokens.

use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie attributes. Always HttpOnly.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Duration,
}

impl CookieConfig {
    pub fn new(name: impl Into<String>, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            max_age,
        }
    }

    fn attributes(&self, max_age_secs: u64) -> String {
        let mut attrs = format!(
            "HttpOnly; SameSite={}; Path={}; Max-Age={}",
            self.same_site.as_str(),
            self.path,
            max_age_secs
        );
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs
    }

    pub fn build_set_cookie(&self, value: &str) -> String {
        format!(
            "{}={}; {}",
            self.name,
            value,
            self.attributes(self.max_age.as_secs())
        )
    }

    /// Deletion must repeat the same Path/SameSite/Secure or browsers keep the cookie.
    pub fn build_delete_cookie(&self) -> String {
        format!("{}=; {}", self.name, self.attributes(0))
    }

    /// `Set-Cookie` header value, `None` if the token contains bytes invalid in a header.
    pub fn set_cookie_header(&self, value: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_set_cookie(value)).ok()
    }

    pub fn delete_cookie_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_delete_cookie()).ok()
    }
}

/// Extract a cookie value from headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
