//! Token creation with configurable TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use cloudstore_core::config::AuthConfig;
use cloudstore_core::error::AppError;

use super::claims::{Claims, IssueKind};

/// Upper bound on the configured TTL (ten years).
const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

/// Creates signed HS256 tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in hours.
    ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_hours: config.token_ttl_hours.min(MAX_TTL_HOURS) as i64,
        }
    }

    /// Issue a token of the given kind for `email`.
    pub fn issue(&self, email: &str, issue: IssueKind) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: email.to_string(),
            issue,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok((token, exp))
    }

    /// Issue a login token for `email`.
    pub fn issue_login(&self, email: &str) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue(email, IssueKind::Login)
    }
}
