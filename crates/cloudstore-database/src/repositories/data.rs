//! Data record repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_entity::data::{CreateDataInfo, DataInfo, child_prefix};

use super::attachment::AttachmentRepository;

/// Repository for the metadata side of an owner's tree.
///
/// Every method is atomic with respect to the metadata store alone.
#[derive(Debug, Clone)]
pub struct DataRepository {
    pool: SqlitePool,
}

impl DataRepository {
    /// Create a new data repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a record by ID, optionally scoped to an owner and filtered by kind.
    ///
    /// A record of the wrong kind is reported as absent.
    pub async fn find_by_id(
        &self,
        owner_id: Option<i64>,
        id: i64,
        is_directory: Option<bool>,
    ) -> AppResult<Option<DataInfo>> {
        sqlx::query_as::<_, DataInfo>(
            "SELECT * FROM data_info WHERE id = ?1 \
             AND (?2 IS NULL OR owner_id = ?2) \
             AND (?3 IS NULL OR is_directory = ?3)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(is_directory)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to find data record", e))
    }

    /// Find the record occupying `(parent_path, name)` for an owner.
    ///
    /// Without a kind filter a directory wins over a same-named file.
    pub async fn find_by_slot(
        &self,
        owner_id: i64,
        parent_path: &str,
        name: &str,
        is_directory: Option<bool>,
    ) -> AppResult<Option<DataInfo>> {
        sqlx::query_as::<_, DataInfo>(
            "SELECT * FROM data_info \
             WHERE owner_id = ?1 AND parent_path = ?2 AND name = ?3 \
             AND (?4 IS NULL OR is_directory = ?4) \
             ORDER BY is_directory DESC LIMIT 1",
        )
        .bind(owner_id)
        .bind(parent_path)
        .bind(name)
        .bind(is_directory)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to find data record by slot", e)
        })
    }

    /// Insert a new record.
    ///
    /// Fails with `AlreadyExists` if the slot is taken, whether detected by
    /// the lookup or by the unique index when a concurrent insert wins.
    pub async fn create(&self, data: &CreateDataInfo) -> AppResult<DataInfo> {
        if self
            .find_by_slot(
                data.owner_id,
                &data.parent_path,
                &data.name,
                Some(data.is_directory),
            )
            .await?
            .is_some()
        {
            return Err(AppError::already_exists(format!(
                "'{}{}' already exists",
                data.parent_path, data.name
            )));
        }

        let record = sqlx::query_as::<_, DataInfo>(
            "INSERT INTO data_info (owner_id, parent_path, name, is_directory, size, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.parent_path)
        .bind(&data.name)
        .bind(data.is_directory)
        .bind(data.size)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::already_exists(format!(
                    "'{}{}' already exists",
                    data.parent_path, data.name
                ))
            }
            _ => AppError::with_source(ErrorKind::StoreFailure, "Failed to create data record", e),
        })?;

        debug!(id = record.id, path = %record.virtual_path(), "Data record inserted");
        Ok(record)
    }

    /// Overwrite the cached size of a record.
    pub async fn update_size(&self, id: i64, size: i64) -> AppResult<DataInfo> {
        sqlx::query_as::<_, DataInfo>("UPDATE data_info SET size = ?2 WHERE id = ?1 RETURNING *")
            .bind(id)
            .bind(size)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to update data size", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Data {id} not found")))
    }

    /// Bring a file record's cached size in line with the physical size.
    ///
    /// Writes only when the values differ.
    pub async fn sync_file_size(&self, record: &DataInfo, actual_size: i64) -> AppResult<DataInfo> {
        if record.size == actual_size {
            return Ok(record.clone());
        }
        debug!(
            id = record.id,
            stored = record.size,
            actual = actual_size,
            "Correcting drifted file size"
        );
        self.update_size(record.id, actual_size).await
    }

    /// Rename a record in one transaction.
    ///
    /// For directories every descendant's `parent_path` prefix is rewritten
    /// in a single bulk update.
    pub async fn rename(&self, owner_id: i64, id: i64, new_name: &str) -> AppResult<DataInfo> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to begin transaction", e)
        })?;

        let current = sqlx::query_as::<_, DataInfo>(
            "SELECT * FROM data_info WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to load data record", e))?
        .ok_or_else(|| AppError::not_found(format!("Data {id} not found")))?;

        let renamed = sqlx::query_as::<_, DataInfo>(
            "UPDATE data_info SET name = ?2 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(new_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::already_exists(format!(
                    "'{}{}' already exists",
                    current.parent_path, new_name
                ))
            }
            _ => AppError::with_source(ErrorKind::StoreFailure, "Failed to rename data record", e),
        })?;

        if current.is_directory {
            let old_prefix = current.descendant_prefix();
            let new_prefix = child_prefix(&current.parent_path, new_name);
            let moved = sqlx::query(
                "UPDATE data_info \
                 SET parent_path = ?3 || substr(parent_path, length(?2) + 1) \
                 WHERE owner_id = ?1 AND substr(parent_path, 1, length(?2)) = ?2",
            )
            .bind(owner_id)
            .bind(&old_prefix)
            .bind(&new_prefix)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to rewrite descendant paths", e)
            })?;
            debug!(
                id,
                descendants = moved.rows_affected(),
                from = %old_prefix,
                to = %new_prefix,
                "Descendant paths rewritten"
            );
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to commit rename", e)
        })?;

        Ok(renamed)
    }

    /// Delete a record together with its descendants and attached rows.
    ///
    /// Returns the deleted record so the caller can locate the physical
    /// object. Fails with `NotFound` if the record is absent.
    pub async fn destroy(&self, owner_id: i64, id: i64) -> AppResult<DataInfo> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to begin transaction", e)
        })?;

        let record = sqlx::query_as::<_, DataInfo>(
            "SELECT * FROM data_info WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to load data record", e))?
        .ok_or_else(|| AppError::not_found(format!("Data {id} not found")))?;

        if record.is_directory {
            let prefix = record.descendant_prefix();
            AttachmentRepository::delete_all_for_path_prefix(&mut tx, owner_id, &prefix).await?;
            let removed = sqlx::query(
                "DELETE FROM data_info \
                 WHERE owner_id = ?1 AND substr(parent_path, 1, length(?2)) = ?2",
            )
            .bind(owner_id)
            .bind(&prefix)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to delete descendants", e)
            })?;
            debug!(id, descendants = removed.rows_affected(), "Descendant records deleted");
        }

        AttachmentRepository::delete_all_for_data_id(&mut tx, id).await?;

        sqlx::query("DELETE FROM data_info WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to delete data record", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to commit delete", e)
        })?;

        Ok(record)
    }

    /// Sum of the cached sizes of an owner's files.
    pub async fn owner_usage(&self, owner_id: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(size), 0) FROM data_info WHERE owner_id = ?1 AND is_directory = 0",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to sum usage", e))
    }

    /// Count every record an owner has.
    pub async fn count_for_owner(&self, owner_id: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM data_info WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to count records", e))
    }
}
