//! Tag, share and favorite rows attached to data records.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_entity::attachment::{DataFavorite, DataShare, DataTag};

const ATTACHMENT_TABLES: [&str; 3] = ["data_tags", "data_shares", "data_favorites"];

/// Repository for rows that reference a data record by ID.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: SqlitePool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tag a data record.
    pub async fn add_tag(&self, data_id: i64, name: &str) -> AppResult<DataTag> {
        sqlx::query_as::<_, DataTag>(
            "INSERT INTO data_tags (data_id, name) VALUES (?1, ?2) RETURNING *",
        )
        .bind(data_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to add tag", e))
    }

    /// Share a data record.
    pub async fn share(&self, data_id: i64) -> AppResult<DataShare> {
        sqlx::query_as::<_, DataShare>(
            "INSERT INTO data_shares (data_id, created_at) VALUES (?1, ?2) RETURNING *",
        )
        .bind(data_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::already_exists(format!("Data {data_id} is already shared"))
            }
            _ => AppError::with_source(ErrorKind::StoreFailure, "Failed to share data", e),
        })
    }

    /// Mark a data record as a favorite.
    pub async fn favorite(&self, data_id: i64) -> AppResult<DataFavorite> {
        sqlx::query_as::<_, DataFavorite>(
            "INSERT INTO data_favorites (data_id) VALUES (?1) RETURNING *",
        )
        .bind(data_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::already_exists(format!("Data {data_id} is already a favorite"))
            }
            _ => AppError::with_source(ErrorKind::StoreFailure, "Failed to add favorite", e),
        })
    }

    /// Total attached rows of every kind referencing a data record.
    pub async fn count_for(&self, data_id: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM data_tags WHERE data_id = ?1) \
                  + (SELECT COUNT(*) FROM data_shares WHERE data_id = ?1) \
                  + (SELECT COUNT(*) FROM data_favorites WHERE data_id = ?1)",
        )
        .bind(data_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to count attachments", e))
    }

    /// Remove every attached row referencing `data_id`.
    ///
    /// Runs on the caller's connection so it joins the caller's transaction.
    pub async fn delete_all_for_data_id(conn: &mut SqliteConnection, data_id: i64) -> AppResult<()> {
        for table in ATTACHMENT_TABLES {
            sqlx::query(&format!("DELETE FROM {table} WHERE data_id = ?1"))
                .bind(data_id)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::StoreFailure,
                        format!("Failed to clear {table}"),
                        e,
                    )
                })?;
        }
        Ok(())
    }

    /// Remove every attached row referencing a record whose `parent_path`
    /// starts with `prefix`.
    pub async fn delete_all_for_path_prefix(
        conn: &mut SqliteConnection,
        owner_id: i64,
        prefix: &str,
    ) -> AppResult<()> {
        for table in ATTACHMENT_TABLES {
            sqlx::query(&format!(
                "DELETE FROM {table} WHERE data_id IN ( \
                    SELECT id FROM data_info \
                    WHERE owner_id = ?1 AND substr(parent_path, 1, length(?2)) = ?2)"
            ))
            .bind(owner_id)
            .bind(prefix)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!("Failed to clear {table} under {prefix}"),
                    e,
                )
            })?;
        }
        Ok(())
    }
}
