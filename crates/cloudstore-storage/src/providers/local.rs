//! Local filesystem physical store.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_core::traits::{ByteStream, ObjectKind, PhysicalStore};

use crate::archive::{artifact_name, zip_directory};

/// Physical store backed by the local filesystem.
///
/// Paths handed in are already resolved by the caller; the only location
/// this store chooses itself is the archive directory.
#[derive(Debug, Clone)]
pub struct LocalPhysicalStore {
    /// Directory receiving download archives.
    tmp_dir: PathBuf,
}

impl LocalPhysicalStore {
    /// Create a new local store, making sure the archive directory exists.
    pub async fn new(tmp_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let tmp_dir = tmp_dir.into();
        fs::create_dir_all(&tmp_dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StoreFailure,
                format!("Failed to create archive directory: {}", tmp_dir.display()),
                e,
            )
        })?;
        Ok(Self { tmp_dir })
    }

    /// Directory where archives are written.
    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    async fn ensure_parent(path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Metadata without following a trailing symlink; `None` when absent.
    async fn probe(path: &Path) -> AppResult<Option<std::fs::Metadata>> {
        match fs::symlink_metadata(path).await {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::StoreFailure,
                format!("Failed to stat {}", path.display()),
                e,
            )),
        }
    }
}

#[async_trait]
impl PhysicalStore for LocalPhysicalStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn create_dir(&self, path: &Path) -> AppResult<()> {
        fs::create_dir_all(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StoreFailure,
                format!("Failed to create directory: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), "Created directory");
        Ok(())
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> AppResult<u64> {
        Self::ensure_parent(path).await?;
        fs::write(path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StoreFailure,
                format!("Failed to write file: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), bytes = data.len(), "Wrote file");
        Ok(data.len() as u64)
    }

    async fn exists(&self, path: &Path, kind: ObjectKind) -> AppResult<bool> {
        Ok(match Self::probe(path).await? {
            Some(meta) => match kind {
                ObjectKind::Directory => meta.is_dir(),
                ObjectKind::File => meta.is_file(),
            },
            None => false,
        })
    }

    /// Any entry counts, including symlinks, which `exists` reports as
    /// neither kind.
    async fn occupied(&self, path: &Path) -> AppResult<bool> {
        Ok(Self::probe(path).await?.is_some())
    }

    async fn file_size(&self, path: &Path) -> AppResult<u64> {
        match Self::probe(path).await? {
            Some(meta) if meta.is_file() => Ok(meta.len()),
            _ => Err(AppError::not_found(format!(
                "File not found: {}",
                path.display()
            ))),
        }
    }

    async fn count_entries(&self, path: &Path) -> AppResult<u64> {
        let mut dir = fs::read_dir(path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Directory not found: {}", path.display()))
            } else {
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!("Failed to list directory: {}", path.display()),
                    e,
                )
            }
        })?;

        let mut count = 0u64;
        while dir
            .next_entry()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to read directory entry", e)
            })?
            .is_some()
        {
            count += 1;
        }
        Ok(count)
    }

    async fn rename(&self, path: &Path, new_name: &str) -> AppResult<Option<PathBuf>> {
        if Self::probe(path).await?.is_none() {
            return Ok(None);
        }

        let target = path.with_file_name(new_name);
        if target != path && Self::probe(&target).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "'{new_name}' is already occupied next to {}",
                path.display()
            )));
        }

        fs::rename(path, &target).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StoreFailure,
                format!("Failed to rename {} -> {}", path.display(), target.display()),
                e,
            )
        })?;
        debug!(from = %path.display(), to = %target.display(), "Renamed");
        Ok(Some(target))
    }

    async fn remove(&self, path: &Path) -> AppResult<()> {
        let result = match Self::probe(path).await? {
            Some(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
            Some(_) => fs::remove_file(path).await,
            None => return Ok(()),
        };

        match result {
            Ok(()) => {
                debug!(path = %path.display(), "Removed");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::StoreFailure,
                format!("Failed to remove {}", path.display()),
                e,
            )),
        }
    }

    async fn archive(&self, path: &Path) -> AppResult<PathBuf> {
        let source = path.to_path_buf();
        let dest = self.tmp_dir.join(artifact_name());
        let target = dest.clone();

        let built = tokio::task::spawn_blocking(move || zip_directory(&source, &target))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Archive task failed", e))
            .and_then(|result| result);

        let files = match built {
            Ok(files) => files,
            Err(e) => {
                if let Err(cleanup) = self.remove(&dest).await {
                    warn!(archive = %dest.display(), error = %cleanup, "Partial archive left behind");
                }
                return Err(e);
            }
        };

        debug!(source = %path.display(), archive = %dest.display(), files, "Built archive");
        Ok(dest)
    }

    async fn open_stream(&self, path: &Path) -> AppResult<ByteStream> {
        let file = fs::File::open(path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("File not found: {}", path.display()))
            } else {
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!("Failed to open file: {}", path.display()),
                    e,
                )
            }
        })?;

        Ok(Box::pin(ReaderStream::new(file)))
    }
}
