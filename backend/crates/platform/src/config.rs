//! Environment Configuration Helpers
//!
//! Thin typed accessors over process environment variables.
//! Every crate builds its own config struct on top of these.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Read a variable that must be present and non-empty.
pub fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

/// Read a variable, treating empty values as unset.
pub fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset.
pub fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

/// Duration given in whole seconds.
pub fn duration_secs(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let secs = parse_or(key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Accepts `true/false`, `1/0`, `yes/no`.
pub fn flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::Invalid {
                key,
                reason: format!("expected a boolean, got {other:?}"),
            }),
        },
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>("K", " 42 ").unwrap(), 42);
        assert!(matches!(
            parse_value::<u64>("K", "forty"),
            Err(ConfigError::Invalid { key: "K", .. })
        ));
    }

    #[test]
    fn test_unset_variables_fall_back() {
        let key = "PLATFORM_CONFIG_TEST_SURELY_UNSET";
        assert!(optional(key).is_none());
        assert!(matches!(
            required("PLATFORM_CONFIG_TEST_SURELY_UNSET"),
            Err(ConfigError::Missing(_))
        ));
        assert_eq!(
            duration_secs("PLATFORM_CONFIG_TEST_SURELY_UNSET", Duration::from_secs(300)).unwrap(),
            Duration::from_secs(300)
        );
        assert!(flag("PLATFORM_CONFIG_TEST_SURELY_UNSET", true).unwrap());
    }
}
