//! JWT configuration.
//!
//! - `JWT_SECRET`: HMAC signing secret. There is no fallback value: a missing secret is a
//!   deployment fault, reported at startup and on every request that needs it.
//! - `JWT_EXPIRES_IN`: token lifetime in seconds (default: 7 days)

use crate::non_empty_var;

const DEFAULT_EXPIRES_IN: i64 = 604_800;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub expires_in: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let config = Self {
            secret: non_empty_var("JWT_SECRET"),
            expires_in: non_empty_var("JWT_EXPIRES_IN")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &i64| *secs > 0)
                .unwrap_or(DEFAULT_EXPIRES_IN),
        };

        if config.secret.is_none() {
            tracing::warn!("JWT_SECRET is not set; authenticated routes will fail with 500");
        }

        config
    }

    pub fn new(secret: impl Into<String>, expires_in: i64) -> Self {
        Self {
            secret: Some(secret.into()),
            expires_in,
        }
    }

    /// Secret as bytes, or `None` when unconfigured.
    pub fn secret_bytes(&self) -> Option<&[u8]> {
        self.secret.as_deref().map(str::as_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_secret() {
        let config = JwtConfig::new("s3cret", 60);
        assert_eq!(config.secret_bytes(), Some("s3cret".as_bytes()));
        assert_eq!(config.expires_in, 60);
    }

    #[test]
    fn test_missing_secret_has_no_bytes() {
        let config = JwtConfig {
            secret: None,
            expires_in: DEFAULT_EXPIRES_IN,
        };
        assert!(config.secret_bytes().is_none());
    }
}
