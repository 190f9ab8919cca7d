//! The authenticated identity passed into every service call.

use serde::{Deserialize, Serialize};

use cloudstore_auth::jwt::{Claims, IssueKind};

/// Who is calling, as proven by a verified credential.
///
/// Only the subject email and the issue kind are carried; the service
/// resolves the email to a user record on each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject email from the credential.
    pub email: String,
    /// What the credential was issued for.
    pub issue: IssueKind,
}

impl Identity {
    /// Creates an identity from its parts.
    pub fn new(email: impl Into<String>, issue: IssueKind) -> Self {
        Self {
            email: email.into(),
            issue,
        }
    }

    /// An identity backed by a login credential.
    pub fn login(email: impl Into<String>) -> Self {
        Self::new(email, IssueKind::Login)
    }

    /// Whether the credential authenticates its bearer.
    pub fn is_authenticated(&self) -> bool {
        self.issue.is_login()
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            issue: claims.issue,
        }
    }
}
