//! # cloudstore-database
//!
//! SQLite connection management and concrete repository implementations
//! for the CloudStore metadata store.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;

#[cfg(test)]
pub(crate) mod test_support {
    use cloudstore_core::config::DatabaseConfig;
    use tempfile::TempDir;

    use crate::connection::DatabasePool;
    use crate::migration::run_migrations;

    /// A migrated database living in a temporary directory.
    pub async fn migrated_pool() -> (TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}", dir.path().join("meta.db").display()),
            ..DatabaseConfig::default()
        };
        let pool = DatabasePool::connect(&config).await.unwrap();
        run_migrations(pool.pool()).await.unwrap();
        (dir, pool)
    }
}
