//! User repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_entity::user::{CreateUser, User};

/// Repository for user lookup and provisioning.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to find user by id", e)
            })
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER(?1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to find user by email", e)
            })
    }

    /// Whether any admin account exists.
    pub async fn has_admin(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_admin = 1")
            .fetch_one(&self.pool)
            .await
            .map(|count| count > 0)
            .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to count admins", e))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name, is_admin, storage_size, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.name)
        .bind(data.is_admin)
        .bind(data.storage_size)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::already_exists(format!(
                    "User with email '{}' or name '{}' already exists",
                    data.email, data.name
                ))
            }
            _ => AppError::with_source(ErrorKind::StoreFailure, "Failed to create user", e),
        })
    }

    /// Delete a user together with every data record and attached row they own.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to begin transaction", e)
        })?;

        for table in ["data_tags", "data_shares", "data_favorites"] {
            sqlx::query(&format!(
                "DELETE FROM {table} WHERE data_id IN (SELECT id FROM data_info WHERE owner_id = ?1)"
            ))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!("Failed to clear {table} for user"),
                    e,
                )
            })?;
        }

        sqlx::query("DELETE FROM data_info WHERE owner_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreFailure, "Failed to delete user data", e)
            })?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StoreFailure, "Failed to delete user", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::StoreFailure, "Failed to commit user delete", e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::migrated_pool;

    fn new_user(email: &str, name: &str, is_admin: bool) -> CreateUser {
        CreateUser {
            email: email.into(),
            name: name.into(),
            is_admin,
            storage_size: 10,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (_dir, db) = migrated_pool().await;
        let repo = UserRepository::new(db.pool().clone());

        assert!(!repo.has_admin().await.unwrap());
        let admin = repo
            .create(&new_user("Root@Example.com", "root", true))
            .await
            .unwrap();
        assert!(repo.has_admin().await.unwrap());

        let found = repo.find_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert!(found.is_admin());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_already_exists() {
        let (_dir, db) = migrated_pool().await;
        let repo = UserRepository::new(db.pool().clone());

        repo.create(&new_user("a@example.com", "a", false)).await.unwrap();
        let err = repo
            .create(&new_user("a@example.com", "b", false))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::AlreadyExists));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let (_dir, db) = migrated_pool().await;
        let repo = UserRepository::new(db.pool().clone());
        assert!(!repo.delete(404).await.unwrap());
    }
}
