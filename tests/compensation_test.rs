//! Failed compensation and failed physical cleanup are surfaced, not swallowed.

mod helpers;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_core::traits::{ByteStream, ObjectKind, PhysicalStore};
use cloudstore_database::repositories::{DataRepository, UserRepository};
use cloudstore_entity::data::ROOT_ID;
use cloudstore_service::{AccessGuard, CreatePayload, DataService, UploadFile};
use cloudstore_storage::LocalPhysicalStore;
use helpers::TestApp;

const REMOVE_FAULT: &str = "disk refused remove";
const RENAME_FAULT: &str = "disk refused rename";

/// What the second `rename` call does.
#[derive(Debug, Clone, Copy)]
enum RenameBack {
    Pass,
    Fail,
    Vanish,
}

/// Local store with faults injected into `remove` and the rename-back.
#[derive(Debug)]
struct FaultyStore {
    inner: LocalPhysicalStore,
    remove_fails: bool,
    rename_back: RenameBack,
    renames: AtomicUsize,
}

#[async_trait]
impl PhysicalStore for FaultyStore {
    fn provider_type(&self) -> &str {
        "faulty"
    }

    async fn create_dir(&self, path: &Path) -> AppResult<()> {
        self.inner.create_dir(path).await
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> AppResult<u64> {
        self.inner.write_file(path, data).await
    }

    async fn exists(&self, path: &Path, kind: ObjectKind) -> AppResult<bool> {
        self.inner.exists(path, kind).await
    }

    async fn occupied(&self, path: &Path) -> AppResult<bool> {
        self.inner.occupied(path).await
    }

    async fn file_size(&self, path: &Path) -> AppResult<u64> {
        self.inner.file_size(path).await
    }

    async fn count_entries(&self, path: &Path) -> AppResult<u64> {
        self.inner.count_entries(path).await
    }

    async fn rename(&self, path: &Path, new_name: &str) -> AppResult<Option<PathBuf>> {
        if self.renames.fetch_add(1, Ordering::SeqCst) == 0 {
            return self.inner.rename(path, new_name).await;
        }
        match self.rename_back {
            RenameBack::Pass => self.inner.rename(path, new_name).await,
            RenameBack::Fail => Err(AppError::store(RENAME_FAULT)),
            RenameBack::Vanish => Ok(None),
        }
    }

    async fn remove(&self, path: &Path) -> AppResult<()> {
        if self.remove_fails {
            return Err(AppError::store(REMOVE_FAULT));
        }
        self.inner.remove(path).await
    }

    async fn archive(&self, path: &Path) -> AppResult<PathBuf> {
        self.inner.archive(path).await
    }

    async fn open_stream(&self, path: &Path) -> AppResult<ByteStream> {
        self.inner.open_stream(path).await
    }
}

/// A data service over the app's database and paths, but the faulty store.
async fn faulty_service(app: &TestApp, remove_fails: bool, rename_back: RenameBack) -> DataService {
    let pool = app.ctx.db.pool().clone();
    let store = FaultyStore {
        inner: LocalPhysicalStore::new(&app.ctx.config.storage.tmp_dir)
            .await
            .unwrap(),
        remove_fails,
        rename_back,
        renames: AtomicUsize::new(0),
    };
    DataService::new(
        Arc::new(AccessGuard::new(Arc::new(UserRepository::new(pool.clone())))),
        Arc::new(DataRepository::new(pool)),
        Arc::clone(&app.ctx.resolver),
        Arc::new(store),
    )
}

fn source_text(err: &AppError) -> String {
    err.source
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_create_reports_failed_cleanup() {
    let app = TestApp::new().await;
    let service = faulty_service(&app, true, RenameBack::Pass).await;
    app.fail_data_writes("INSERT").await;

    let err = service
        .create(
            &TestApp::identity(&app.alice),
            app.alice.id,
            ROOT_ID,
            CreatePayload::Files(vec![UploadFile::new("stuck.txt", b"bytes".to_vec())]),
        )
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::StoreFailure));
    assert!(err.message.contains("Failed to create data record"), "{err}");
    assert!(source_text(&err).contains(REMOVE_FAULT), "{err}");
    assert!(app.physical(&app.alice, "/", "stuck.txt").is_file());
    assert_eq!(app.record_count(&app.alice).await, 0);
}

#[tokio::test]
async fn test_rename_reports_failed_move_back() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "old.txt", b"x").await;
    let service = faulty_service(&app, false, RenameBack::Fail).await;
    app.fail_data_writes("UPDATE").await;

    let err = service
        .update(&TestApp::identity(&app.alice), app.alice.id, file.id, "new.txt")
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::StoreFailure));
    assert!(err.message.contains("Failed to rename data record"), "{err}");
    assert!(source_text(&err).contains(RENAME_FAULT), "{err}");
    assert!(app.physical(&app.alice, "/", "new.txt").is_file());
    assert_eq!(app.record(file.id).await.unwrap().name, "old.txt");
}

#[tokio::test]
async fn test_rename_reports_object_gone_before_move_back() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "old.txt", b"x").await;
    let service = faulty_service(&app, false, RenameBack::Vanish).await;
    app.fail_data_writes("UPDATE").await;

    let err = service
        .update(&TestApp::identity(&app.alice), app.alice.id, file.id, "new.txt")
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::StoreFailure));
    assert!(err.message.contains("vanished"), "{err}");
    assert!(err.message.contains("Failed to rename data record"), "{err}");
}

#[tokio::test]
async fn test_destroy_reports_unremovable_object() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "sticky.txt", b"x").await;
    let service = faulty_service(&app, true, RenameBack::Pass).await;

    let err = service
        .destroy(&TestApp::identity(&app.alice), app.alice.id, file.id)
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::StoreFailure));
    assert!(source_text(&err).contains(REMOVE_FAULT), "{err}");
    assert!(app.record(file.id).await.is_none());
    assert!(app.physical(&app.alice, "/", "sticky.txt").is_file());
}
