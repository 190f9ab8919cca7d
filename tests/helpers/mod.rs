//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use cloudstore::AppContext;
use cloudstore_core::config::AppConfig;
use cloudstore_entity::data::DataInfo;
use cloudstore_entity::user::User;
use cloudstore_service::{CreatePayload, Identity, NewUser, UploadFile};

pub const ADMIN_EMAIL: &str = "admin@cloudstore.test";

/// A fully wired application rooted in a temporary directory, with one
/// administrator and two regular tenants.
pub struct TestApp {
    pub ctx: AppContext,
    pub admin: User,
    pub alice: User,
    pub bob: User,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite:{}", dir.path().join("meta.db").display());
        config.storage.root_path = dir.path().join("storage").display().to_string();
        config.storage.tmp_dir = dir.path().join("tmp").display().to_string();
        config.storage.total_capacity_bytes = 1_000_000;
        config.auth.jwt_secret = "integration-secret".to_string();

        let ctx = AppContext::build(config).await.unwrap();

        let admin = ctx
            .users
            .bootstrap_admin(NewUser {
                email: ADMIN_EMAIL.to_string(),
                name: "admin".to_string(),
                is_admin: true,
                storage_size: 100_000,
            })
            .await
            .unwrap();

        let operator = Identity::login(ADMIN_EMAIL);
        let alice = ctx
            .users
            .create_user(&operator, tenant("alice"))
            .await
            .unwrap();
        let bob = ctx.users.create_user(&operator, tenant("bob")).await.unwrap();

        Self {
            ctx,
            admin,
            alice,
            bob,
            _dir: dir,
        }
    }

    pub fn admin_identity(&self) -> Identity {
        Identity::login(&self.admin.email)
    }

    pub fn identity(user: &User) -> Identity {
        Identity::login(&user.email)
    }

    /// Where a record at `parent_path`/`name` lives on disk.
    pub fn physical(&self, owner: &User, parent_path: &str, name: &str) -> PathBuf {
        self.ctx.resolver.physical_path(owner.id, parent_path, name)
    }

    pub async fn mkdir(&self, owner: &User, parent_id: i64, name: &str) -> DataInfo {
        self.ctx
            .data
            .create(
                &Self::identity(owner),
                owner.id,
                parent_id,
                CreatePayload::Directory(name.to_string()),
            )
            .await
            .unwrap()
            .remove(0)
    }

    pub async fn upload(&self, owner: &User, parent_id: i64, name: &str, content: &[u8]) -> DataInfo {
        self.ctx
            .data
            .create(
                &Self::identity(owner),
                owner.id,
                parent_id,
                CreatePayload::Files(vec![UploadFile::new(name, content.to_vec())]),
            )
            .await
            .unwrap()
            .remove(0)
    }

    /// Make every `op` (`INSERT` or `UPDATE`) on `data_info` fail.
    pub async fn fail_data_writes(&self, op: &str) {
        let sql = format!(
            "CREATE TRIGGER fail_{op} BEFORE {op} ON data_info \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END"
        );
        sqlx::query(&sql).execute(self.ctx.db.pool()).await.unwrap();
    }

    pub async fn restore_data_writes(&self, op: &str) {
        let sql = format!("DROP TRIGGER IF EXISTS fail_{op}");
        sqlx::query(&sql).execute(self.ctx.db.pool()).await.unwrap();
    }

    pub async fn record_count(&self, owner: &User) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM data_info WHERE owner_id = ?1")
            .bind(owner.id)
            .fetch_one(self.ctx.db.pool())
            .await
            .unwrap()
    }

    pub async fn record(&self, id: i64) -> Option<DataInfo> {
        sqlx::query_as::<_, DataInfo>("SELECT * FROM data_info WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.ctx.db.pool())
            .await
            .unwrap()
    }
}

fn tenant(name: &str) -> NewUser {
    NewUser {
        email: format!("{name}@cloudstore.test"),
        name: name.to_string(),
        is_admin: false,
        storage_size: 100_000,
    }
}
