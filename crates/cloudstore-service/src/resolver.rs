//! Virtual-to-physical path resolution.

use std::path::PathBuf;
use std::sync::Arc;

use cloudstore_core::error::AppError;
use cloudstore_core::result::AppResult;
use cloudstore_database::repositories::DataRepository;
use cloudstore_entity::data::{DataInfo, ROOT_ID, ROOT_PATH, is_valid_name};

/// Maps `(owner, parent id, name)` onto virtual and physical paths.
///
/// The storage root is fixed at construction.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Directory under which every owner root lives.
    storage_root: PathBuf,
    /// Data repository for parent lookups.
    data_repo: Arc<DataRepository>,
}

impl PathResolver {
    /// Creates a resolver over `storage_root`.
    pub fn new(storage_root: impl Into<PathBuf>, data_repo: Arc<DataRepository>) -> Self {
        Self {
            storage_root: storage_root.into(),
            data_repo,
        }
    }

    /// `{storage_root}/{owner_id}`, the directory removed with the user.
    pub fn owner_dir(&self, owner_id: i64) -> PathBuf {
        self.storage_root.join(owner_id.to_string())
    }

    /// `{storage_root}/{owner_id}/root`, where the virtual `/` lives.
    pub fn owner_root(&self, owner_id: i64) -> PathBuf {
        self.owner_dir(owner_id).join("root")
    }

    /// Physical location of `parent_path + name` in `owner_id`'s tree.
    pub fn physical_path(&self, owner_id: i64, parent_path: &str, name: &str) -> PathBuf {
        let relative = format!("{}{}", parent_path.trim_start_matches('/'), name);
        self.owner_root(owner_id).join(relative)
    }

    /// Physical location of an existing record.
    pub fn record_path(&self, record: &DataInfo) -> PathBuf {
        self.physical_path(record.owner_id, &record.parent_path, &record.name)
    }

    /// Virtual path of the directory `parent_id`, which must be a
    /// directory owned by `owner_id`. Id `0` is the root and needs no
    /// lookup.
    pub async fn resolve_parent(&self, owner_id: i64, parent_id: i64) -> AppResult<String> {
        if parent_id == ROOT_ID {
            return Ok(ROOT_PATH.to_string());
        }
        self.data_repo
            .find_by_id(Some(owner_id), parent_id, Some(true))
            .await?
            .map(|dir| dir.descendant_prefix())
            .ok_or_else(|| AppError::not_found(format!("Directory {parent_id} not found")))
    }

    /// Reject empty names and names with reserved characters.
    pub fn validate_name(name: &str) -> AppResult<()> {
        if is_valid_name(name) {
            Ok(())
        } else {
            Err(AppError::invalid_name(format!("Invalid name: {name:?}")))
        }
    }
}
