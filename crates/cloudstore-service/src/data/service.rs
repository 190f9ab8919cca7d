//! Two-store create, read, rename and delete with compensation.
//!
//! The metadata store and the physical store cannot commit together, so
//! each operation fixes an order and undoes the first step if the second
//! fails:
//!
//! - create writes bytes first and removes them if the row cannot commit;
//! - rename moves the object first and moves it back if the row cannot
//!   commit;
//! - delete drops rows first, then removes the object and reports a
//!   remnant it could not remove;
//! - read trusts the filesystem and purges rows that lost their object.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_core::traits::{ByteStream, ObjectKind, PhysicalStore};
use cloudstore_database::repositories::DataRepository;
use cloudstore_entity::data::{CreateDataInfo, DataInfo, DataView};

use super::types::{CreatePayload, DownloadArtifact, ReadMode, ReadOutcome, UploadFile};
use crate::access::AccessGuard;
use crate::context::Identity;
use crate::resolver::PathResolver;

/// Keeps metadata records and physical objects coherent.
#[derive(Debug, Clone)]
pub struct DataService {
    /// Policy enforcement.
    access: Arc<AccessGuard>,
    /// Metadata store.
    data_repo: Arc<DataRepository>,
    /// Path resolution.
    resolver: Arc<PathResolver>,
    /// Physical store.
    store: Arc<dyn PhysicalStore>,
}

impl DataService {
    /// Creates a new data service.
    pub fn new(
        access: Arc<AccessGuard>,
        data_repo: Arc<DataRepository>,
        resolver: Arc<PathResolver>,
        store: Arc<dyn PhysicalStore>,
    ) -> Self {
        Self {
            access,
            data_repo,
            resolver,
            store,
        }
    }

    /// Create files or a directory under `parent_id` in `owner_id`'s tree.
    pub async fn create(
        &self,
        identity: &Identity,
        owner_id: i64,
        parent_id: i64,
        payload: CreatePayload,
    ) -> AppResult<Vec<DataInfo>> {
        self.access.authorize_owner(identity, owner_id).await?;
        let parent_path = self.resolver.resolve_parent(owner_id, parent_id).await?;

        match payload {
            CreatePayload::Directory(name) => {
                let record = self.create_directory(owner_id, &parent_path, &name).await?;
                Ok(vec![record])
            }
            CreatePayload::Files(files) => {
                let mut created = Vec::with_capacity(files.len());
                for file in files {
                    created.push(self.create_file(owner_id, &parent_path, file).await?);
                }
                Ok(created)
            }
        }
    }

    async fn create_directory(
        &self,
        owner_id: i64,
        parent_path: &str,
        name: &str,
    ) -> AppResult<DataInfo> {
        PathResolver::validate_name(name)?;

        if self
            .data_repo
            .find_by_slot(owner_id, parent_path, name, None)
            .await?
            .is_some()
        {
            return Err(AppError::already_exists(format!(
                "'{parent_path}{name}' already exists"
            )));
        }

        let path = self.resolver.physical_path(owner_id, parent_path, name);
        self.clear_orphan(owner_id, &path).await?;
        self.store.create(&path, ObjectKind::Directory, None).await?;

        let committed = self
            .data_repo
            .create(&CreateDataInfo {
                owner_id,
                parent_path: parent_path.to_string(),
                name: name.to_string(),
                is_directory: true,
                size: 0,
            })
            .await;

        match committed {
            Ok(record) => {
                info!(owner_id, data_id = record.id, path = %record.virtual_path(), "Directory created");
                Ok(record)
            }
            Err(cause) => Err(self.undo_create(&path, cause).await),
        }
    }

    async fn create_file(
        &self,
        owner_id: i64,
        parent_path: &str,
        file: UploadFile,
    ) -> AppResult<DataInfo> {
        let name = file.file_name().to_string();
        PathResolver::validate_name(&name)?;

        if self
            .data_repo
            .find_by_slot(owner_id, parent_path, &name, Some(true))
            .await?
            .is_some()
        {
            return Err(AppError::already_exists(format!(
                "A directory named '{parent_path}{name}' already exists"
            )));
        }
        let existing = self
            .data_repo
            .find_by_slot(owner_id, parent_path, &name, Some(false))
            .await?;

        let path = self.resolver.physical_path(owner_id, parent_path, &name);
        if existing.is_some() {
            self.store.remove(&path).await?;
        } else {
            self.clear_orphan(owner_id, &path).await?;
        }

        let written = self
            .store
            .create(&path, ObjectKind::File, Some(file.content))
            .await?;

        let committed = match i64::try_from(written) {
            Ok(size) => match &existing {
                Some(record) => self.data_repo.update_size(record.id, size).await,
                None => {
                    self.data_repo
                        .create(&CreateDataInfo {
                            owner_id,
                            parent_path: parent_path.to_string(),
                            name: name.clone(),
                            is_directory: false,
                            size,
                        })
                        .await
                }
            },
            Err(_) => Err(AppError::internal(format!("File size {written} out of range"))),
        };

        match committed {
            Ok(record) => {
                info!(
                    owner_id,
                    data_id = record.id,
                    path = %record.virtual_path(),
                    size = record.size,
                    overwritten = existing.is_some(),
                    "File stored"
                );
                Ok(record)
            }
            Err(cause) => Err(self.undo_create(&path, cause).await),
        }
    }

    /// Remove a physical object that has no metadata record.
    async fn clear_orphan(&self, owner_id: i64, path: &Path) -> AppResult<()> {
        if self.store.occupied(path).await? {
            warn!(owner_id, path = %path.display(), "Removing orphaned physical object");
            self.store.remove(path).await?;
        }
        Ok(())
    }

    /// Roll back a physical write after the metadata commit failed.
    ///
    /// Yields the original error, or the rollback error if cleanup fails.
    async fn undo_create(&self, path: &Path, cause: AppError) -> AppError {
        match self.store.remove(path).await {
            Ok(()) => {
                warn!(path = %path.display(), error = %cause, "Create rolled back");
                cause
            }
            Err(rollback) => {
                error!(
                    path = %path.display(),
                    error = %cause,
                    rollback_error = %rollback,
                    "Create rollback failed"
                );
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!(
                        "Failed to remove {} after '{}'",
                        path.display(),
                        cause.message
                    ),
                    rollback,
                )
            }
        }
    }

    /// Read a record, reconciling it against the physical store first.
    pub async fn read(
        &self,
        identity: &Identity,
        owner_id: i64,
        data_id: i64,
        mode: ReadMode,
    ) -> AppResult<ReadOutcome> {
        self.access.authorize_owner(identity, owner_id).await?;

        let record = self.find(owner_id, data_id).await?;
        let path = self.resolver.record_path(&record);

        if !self.store.exists(&path, record.kind()).await? {
            self.purge_stale(&record).await?;
            return Err(AppError::not_found(format!("Data {data_id} not found")));
        }

        let (record, size) = if record.is_directory {
            let children = self.store.count_entries(&path).await?;
            (record, i64::try_from(children).unwrap_or(i64::MAX))
        } else {
            let actual = self.store.file_size(&path).await?;
            let actual = i64::try_from(actual)
                .map_err(|_| AppError::internal(format!("File size {actual} out of range")))?;
            let synced = self.data_repo.sync_file_size(&record, actual).await?;
            let size = synced.size;
            (synced, size)
        };

        let file = match mode {
            ReadMode::Info => None,
            ReadMode::Download if record.is_directory => {
                Some(DownloadArtifact::Archive(self.store.archive(&path).await?))
            }
            ReadMode::Download => Some(DownloadArtifact::File(path)),
        };

        Ok(ReadOutcome {
            info: DataView::new(&record, size),
            file,
        })
    }

    /// Rename a record and its physical object.
    pub async fn update(
        &self,
        identity: &Identity,
        owner_id: i64,
        data_id: i64,
        new_name: &str,
    ) -> AppResult<DataInfo> {
        self.access.authorize_owner(identity, owner_id).await?;
        PathResolver::validate_name(new_name)?;

        let record = self.find(owner_id, data_id).await?;
        let path = self.resolver.record_path(&record);

        let Some(moved) = self.store.rename(&path, new_name).await? else {
            self.purge_stale(&record).await?;
            return Err(AppError::not_found(format!("Data {data_id} not found")));
        };

        match self.data_repo.rename(owner_id, data_id, new_name).await {
            Ok(renamed) => {
                info!(
                    owner_id,
                    data_id,
                    from = %record.name,
                    to = %renamed.name,
                    "Data renamed"
                );
                Ok(renamed)
            }
            Err(cause) => match self.store.rename(&moved, &record.name).await {
                Ok(Some(_)) => {
                    warn!(data_id, error = %cause, "Rename rolled back");
                    Err(cause)
                }
                Ok(None) => {
                    error!(data_id, error = %cause, "Rename rollback found nothing to restore");
                    Err(AppError::store(format!(
                        "Renamed object {} vanished before rollback after '{}'",
                        moved.display(),
                        cause.message
                    )))
                }
                Err(rollback) => {
                    error!(
                        data_id,
                        error = %cause,
                        rollback_error = %rollback,
                        "Rename rollback failed"
                    );
                    Err(AppError::with_source(
                        ErrorKind::StoreFailure,
                        format!(
                            "Failed to restore {} after '{}'",
                            path.display(),
                            cause.message
                        ),
                        rollback,
                    ))
                }
            },
        }
    }

    /// Delete a record, its descendants, and the physical object.
    pub async fn destroy(&self, identity: &Identity, owner_id: i64, data_id: i64) -> AppResult<()> {
        self.access.authorize_owner(identity, owner_id).await?;

        let removed = self.data_repo.destroy(owner_id, data_id).await?;
        let path = self.resolver.record_path(&removed);

        // Absence is already success here; anything else is a real fault.
        if let Err(e) = self.store.remove(&path).await {
            error!(
                owner_id,
                data_id,
                path = %path.display(),
                error = %e,
                "Physical object left behind after delete"
            );
            return Err(AppError::with_source(
                ErrorKind::StoreFailure,
                format!(
                    "Data {data_id} was deleted but {} could not be removed",
                    path.display()
                ),
                e,
            ));
        }

        info!(owner_id, data_id, path = %removed.virtual_path(), "Data deleted");
        Ok(())
    }

    /// Open a download artifact for streaming.
    pub async fn open_download(&self, artifact: &DownloadArtifact) -> AppResult<ByteStream> {
        self.store.open_stream(artifact.path()).await
    }

    /// Remove a temporary artifact once it has been served.
    pub async fn discard(&self, artifact: &DownloadArtifact) -> AppResult<()> {
        if artifact.is_temporary() {
            self.store.remove(artifact.path()).await?;
        }
        Ok(())
    }

    async fn find(&self, owner_id: i64, data_id: i64) -> AppResult<DataInfo> {
        self.data_repo
            .find_by_id(Some(owner_id), data_id, None)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Data {data_id} not found")))
    }

    /// Drop a record whose physical object is gone.
    async fn purge_stale(&self, record: &DataInfo) -> AppResult<()> {
        warn!(
            owner_id = record.owner_id,
            data_id = record.id,
            path = %record.virtual_path(),
            "Purging record with no physical object"
        );
        match self.data_repo.destroy(record.owner_id, record.id).await {
            Err(e) if !e.is(ErrorKind::NotFound) => Err(e),
            _ => Ok(()),
        }
    }
}
