//! Data record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudstore_core::traits::ObjectKind;

use super::path::child_prefix;

/// One file or directory in an owner's virtual tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DataInfo {
    /// Unique record identifier. Never `0`; the root is implicit.
    pub id: i64,
    /// The owning user.
    pub owner_id: i64,
    /// Slash-terminated virtual path of the containing directory.
    pub parent_path: String,
    /// Entry name.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Cached file size in bytes. The filesystem is authoritative.
    pub size: i64,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

impl DataInfo {
    /// The entry's kind.
    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from_is_directory(self.is_directory)
    }

    /// Full virtual path of this entry, e.g. `/docs/report.txt`.
    pub fn virtual_path(&self) -> String {
        format!("{}{}", self.parent_path, self.name)
    }

    /// Prefix shared by the `parent_path` of every descendant.
    pub fn descendant_prefix(&self) -> String {
        child_prefix(&self.parent_path, &self.name)
    }
}

/// Data required to create a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDataInfo {
    /// The owning user.
    pub owner_id: i64,
    /// Slash-terminated virtual parent path.
    pub parent_path: String,
    /// Entry name.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Initial size in bytes (files only).
    pub size: i64,
}

/// The info payload reported by reads.
///
/// `size` is the reconciled byte length for files and the live child count
/// for directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataView {
    /// Record identifier.
    pub id: i64,
    /// Slash-terminated virtual parent path.
    pub parent_path: String,
    /// Entry name.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Byte size (files) or child count (directories).
    pub size: i64,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

impl DataView {
    /// Build a view from a record and its computed size.
    pub fn new(info: &DataInfo, size: i64) -> Self {
        Self {
            id: info.id,
            parent_path: info.parent_path.clone(),
            name: info.name.clone(),
            is_directory: info.is_directory,
            size,
            created_at: info.created_at,
        }
    }
}
