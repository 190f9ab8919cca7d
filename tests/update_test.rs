//! Rename: physical move first, metadata second, move back on failure.

mod helpers;

use cloudstore_core::error::ErrorKind;
use cloudstore_entity::data::ROOT_ID;
use cloudstore_service::ReadMode;
use helpers::TestApp;

#[tokio::test]
async fn test_rename_file() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "before.txt", b"content").await;

    let renamed = app
        .ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, file.id, "after.txt")
        .await
        .unwrap();

    assert_eq!(renamed.id, file.id);
    assert_eq!(renamed.name, "after.txt");
    assert!(!app.physical(&app.alice, "/", "before.txt").exists());
    assert_eq!(
        std::fs::read(app.physical(&app.alice, "/", "after.txt")).unwrap(),
        b"content"
    );
}

#[tokio::test]
async fn test_rename_directory_moves_descendants() {
    let app = TestApp::new().await;
    let a = app.mkdir(&app.alice, ROOT_ID, "a").await;
    let b = app.mkdir(&app.alice, a.id, "b").await;
    let c = app.upload(&app.alice, b.id, "c.txt", b"deep").await;
    let sibling = app.mkdir(&app.alice, ROOT_ID, "ab").await;
    let cousin = app.upload(&app.alice, sibling.id, "x.txt", b"x").await;

    app.ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, a.id, "z")
        .await
        .unwrap();

    assert_eq!(app.record(b.id).await.unwrap().parent_path, "/z/");
    assert_eq!(app.record(c.id).await.unwrap().parent_path, "/z/b/");
    assert_eq!(app.record(cousin.id).await.unwrap().parent_path, "/ab/");
    assert!(app.physical(&app.alice, "/z/b/", "c.txt").is_file());

    let read = app
        .ctx
        .data
        .read(&TestApp::identity(&app.alice), app.alice.id, c.id, ReadMode::Info)
        .await
        .unwrap();
    assert_eq!(read.info.size, 4);
}

#[tokio::test]
async fn test_rename_onto_occupied_name_fails() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "one.txt", b"1").await;
    app.upload(&app.alice, ROOT_ID, "two.txt", b"2").await;
    app.mkdir(&app.alice, ROOT_ID, "dir").await;
    let identity = TestApp::identity(&app.alice);

    for target in ["two.txt", "dir"] {
        let err = app
            .ctx
            .data
            .update(&identity, app.alice.id, file.id, target)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::AlreadyExists), "{target} gave {err}");
    }

    assert_eq!(app.record(file.id).await.unwrap().name, "one.txt");
    assert_eq!(
        std::fs::read(app.physical(&app.alice, "/", "two.txt")).unwrap(),
        b"2"
    );
}

#[tokio::test]
async fn test_rename_to_same_name_is_a_no_op() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "same.txt", b"s").await;

    let renamed = app
        .ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, file.id, "same.txt")
        .await
        .unwrap();
    assert_eq!(renamed.name, "same.txt");
    assert!(app.physical(&app.alice, "/", "same.txt").is_file());
}

#[tokio::test]
async fn test_rename_rejects_invalid_name() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "ok.txt", b"x").await;

    let err = app
        .ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, file.id, "bad/name")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidName));
    assert!(app.physical(&app.alice, "/", "ok.txt").is_file());
}

#[tokio::test]
async fn test_rename_of_stale_record_purges_it() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "ghost.txt", b"boo").await;
    std::fs::remove_file(app.physical(&app.alice, "/", "ghost.txt")).unwrap();

    let err = app
        .ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, file.id, "spirit.txt")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    assert!(app.record(file.id).await.is_none());
}

#[tokio::test]
async fn test_failed_metadata_rename_restores_physical_name() {
    let app = TestApp::new().await;
    let dir = app.mkdir(&app.alice, ROOT_ID, "keep").await;
    app.upload(&app.alice, dir.id, "inside.txt", b"i").await;
    app.fail_data_writes("UPDATE").await;

    let err = app
        .ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, dir.id, "moved")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::StoreFailure));

    assert!(app.physical(&app.alice, "/", "keep").is_dir());
    assert!(app.physical(&app.alice, "/keep/", "inside.txt").is_file());
    assert!(!app.physical(&app.alice, "/", "moved").exists());
    assert_eq!(app.record(dir.id).await.unwrap().name, "keep");
}

#[tokio::test]
async fn test_rename_unknown_id_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .ctx
        .data
        .update(&TestApp::identity(&app.alice), app.alice.id, 4242, "x")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}
