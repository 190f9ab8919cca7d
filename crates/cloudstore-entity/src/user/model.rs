//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tenant of the storage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier, also the name of the owner root directory.
    pub id: i64,
    /// Unique email address; the subject of login credentials.
    pub email: String,
    /// Unique display name.
    pub name: String,
    /// Whether the user holds administrative privileges.
    pub is_admin: bool,
    /// Capacity granted to this user, in bytes.
    pub storage_size: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Admin flag.
    pub is_admin: bool,
    /// Granted capacity in bytes.
    pub storage_size: i64,
}

/// Storage consumption report for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUsage {
    /// Sum of the user's file sizes in bytes.
    pub used_bytes: i64,
    /// Granted capacity in bytes.
    pub storage_size: i64,
}
