//! Attached record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tag applied to a data entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataTag {
    /// Row identifier.
    pub id: i64,
    /// The tagged entry.
    pub data_id: i64,
    /// Tag label.
    pub name: String,
}

/// A share grant on a data entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataShare {
    /// Row identifier.
    pub id: i64,
    /// The shared entry.
    pub data_id: i64,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
}

/// A favorite mark on a data entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataFavorite {
    /// Row identifier.
    pub id: i64,
    /// The favorited entry.
    pub data_id: i64,
}
