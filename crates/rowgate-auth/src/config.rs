//! Auth configuration.

use std::time::Duration;

/// Default token lifetime: 14 days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Default username for the bootstrap admin account.
pub const DEFAULT_ADMIN_USERNAME: &str = "rowgate_admin";

/// Length of generated bootstrap admin passwords.
pub const GENERATED_PASSWORD_LENGTH: usize = 12;

/// Configuration for credential flows and token issuance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret for token signing.
    pub secret: Vec<u8>,

    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,

    /// Username of the bootstrap admin account.
    pub admin_username: String,
}

impl AuthConfig {
    /// Create a configuration with the given signing secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
        }
    }

    /// Set the token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl_secs = ttl.as_secs() as i64;
        self
    }

    /// Set the bootstrap admin username.
    pub fn with_admin_username(mut self, username: impl Into<String>) -> Self {
        self.admin_username = username.into();
        self
    }

    /// Load from environment variables.
    ///
    /// `ROWGATE_SECRET` is required; `ROWGATE_TOKEN_TTL_SECS` and
    /// `ROWGATE_ADMIN_USERNAME` override the defaults.
    pub fn from_env() -> Result<Self, String> {
        let secret = std::env::var("ROWGATE_SECRET")
            .map_err(|_| "no token secret configured (set ROWGATE_SECRET)".to_string())?;

        let mut config = Self::new(secret.into_bytes());

        if let Ok(ttl) = std::env::var("ROWGATE_TOKEN_TTL_SECS") {
            config.token_ttl_secs = ttl
                .parse()
                .map_err(|_| format!("invalid ROWGATE_TOKEN_TTL_SECS: {}", ttl))?;
        }
        if let Ok(username) = std::env::var("ROWGATE_ADMIN_USERNAME") {
            config.admin_username = username;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new(b"secret".to_vec());
        assert_eq!(config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.admin_username, DEFAULT_ADMIN_USERNAME);
    }

    #[test]
    fn test_builder() {
        let config = AuthConfig::new(b"secret".to_vec())
            .with_token_ttl(Duration::from_secs(3600))
            .with_admin_username("root");

        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.admin_username, "root");
    }
}
