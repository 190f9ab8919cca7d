//! Claims carried by every issued token.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// What the token was issued for.
    pub issue: IssueKind,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Purpose a token was issued for. Only login tokens authenticate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Issued after a successful login.
    Login,
    /// Anything else.
    #[serde(other)]
    Other,
}

impl IssueKind {
    /// Whether a token of this kind authenticates its bearer.
    pub fn is_login(&self) -> bool {
        matches!(self, Self::Login)
    }
}

impl Claims {
    /// The subject email.
    pub fn email(&self) -> &str {
        &self.sub
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
