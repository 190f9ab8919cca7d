//! Physical store trait for filesystem-backed object storage.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// The two kinds of object a tree entry can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

impl ObjectKind {
    /// Map a stored `is_directory` flag to a kind.
    pub fn from_is_directory(is_directory: bool) -> Self {
        if is_directory {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Returns `true` for directories.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Filesystem primitives addressed only by resolved physical paths.
///
/// Implementations never retry internally: every call either completes
/// or fails explicitly, and the caller owns compensation.
#[async_trait]
pub trait PhysicalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Create a directory (and any missing parents). Succeeds if it
    /// already exists.
    async fn create_dir(&self, path: &Path) -> AppResult<()>;

    /// Write bytes to a file, replacing any previous content. Returns the
    /// resulting size in bytes.
    async fn write_file(&self, path: &Path, data: Bytes) -> AppResult<u64>;

    /// Check whether an object of the given kind exists at `path`.
    async fn exists(&self, path: &Path, kind: ObjectKind) -> AppResult<bool>;

    /// Byte length of the file at `path`.
    async fn file_size(&self, path: &Path) -> AppResult<u64>;

    /// Number of direct entries in the directory at `path`.
    async fn count_entries(&self, path: &Path) -> AppResult<u64>;

    /// Rename the leaf component of `path` to `new_name` in place.
    ///
    /// Returns `Ok(None)` if the source does not exist and fails with
    /// `AlreadyExists` if the destination is occupied.
    async fn rename(&self, path: &Path, new_name: &str) -> AppResult<Option<PathBuf>>;

    /// Recursively delete whatever exists at `path`. Absence is not an
    /// error.
    async fn remove(&self, path: &Path) -> AppResult<()>;

    /// Package the directory at `path` into a temporary zip artifact and
    /// return the artifact's path.
    async fn archive(&self, path: &Path) -> AppResult<PathBuf>;

    /// Open the file at `path` for streaming.
    async fn open_stream(&self, path: &Path) -> AppResult<ByteStream>;

    /// Check whether anything, of either kind, occupies `path`.
    async fn occupied(&self, path: &Path) -> AppResult<bool> {
        Ok(self.exists(path, ObjectKind::Directory).await?
            || self.exists(path, ObjectKind::File).await?)
    }

    /// Create an object of the given kind. Files require `content`.
    ///
    /// Returns the written byte size for files and `0` for directories.
    async fn create(&self, path: &Path, kind: ObjectKind, content: Option<Bytes>) -> AppResult<u64> {
        match (kind, content) {
            (ObjectKind::Directory, _) => {
                self.create_dir(path).await?;
                Ok(0)
            }
            (ObjectKind::File, Some(data)) => self.write_file(path, data).await,
            (ObjectKind::File, None) => Err(AppError::internal(format!(
                "No content supplied for file {}",
                path.display()
            ))),
        }
    }
}
