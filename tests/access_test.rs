//! Ownership, administrator override and credential handling.

mod helpers;

use cloudstore_auth::jwt::IssueKind;
use cloudstore_core::error::ErrorKind;
use cloudstore_entity::data::ROOT_ID;
use cloudstore_service::{CreatePayload, Identity, ReadMode};
use helpers::TestApp;

#[tokio::test]
async fn test_owner_other_user_and_admin() {
    let app = TestApp::new().await;
    let owner = TestApp::identity(&app.alice);
    let dir = app.mkdir(&app.alice, ROOT_ID, "mydir").await;

    let expected = app
        .ctx
        .config
        .storage
        .root_path
        .clone();
    let on_disk = std::path::Path::new(&expected)
        .join(app.alice.id.to_string())
        .join("root")
        .join("mydir");
    assert!(on_disk.is_dir());

    let err = app
        .ctx
        .data
        .create(&owner, app.alice.id, ROOT_ID, CreatePayload::Directory("mydir".into()))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AlreadyExists));

    let err = app
        .ctx
        .data
        .read(&TestApp::identity(&app.bob), app.alice.id, dir.id, ReadMode::Info)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let as_owner = app
        .ctx
        .data
        .read(&owner, app.alice.id, dir.id, ReadMode::Info)
        .await
        .unwrap();
    let as_admin = app
        .ctx
        .data
        .read(&app.admin_identity(), app.alice.id, dir.id, ReadMode::Info)
        .await
        .unwrap();
    assert_eq!(as_owner.info, as_admin.info);
}

#[tokio::test]
async fn test_other_user_cannot_mutate() {
    let app = TestApp::new().await;
    let file = app.upload(&app.alice, ROOT_ID, "private.txt", b"p").await;
    let bob = TestApp::identity(&app.bob);

    let err = app
        .ctx
        .data
        .update(&bob, app.alice.id, file.id, "mine.txt")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let err = app
        .ctx
        .data
        .destroy(&bob, app.alice.id, file.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let err = app
        .ctx
        .data
        .create(&bob, app.alice.id, ROOT_ID, CreatePayload::Directory("intruder".into()))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    assert!(app.physical(&app.alice, "/", "private.txt").is_file());
    assert_eq!(app.record_count(&app.alice).await, 1);
}

#[tokio::test]
async fn test_admin_acts_on_any_tree() {
    let app = TestApp::new().await;
    let admin = app.admin_identity();

    let created = app
        .ctx
        .data
        .create(&admin, app.bob.id, ROOT_ID, CreatePayload::Directory("by-admin".into()))
        .await
        .unwrap();
    assert_eq!(created[0].owner_id, app.bob.id);
    assert!(app.physical(&app.bob, "/", "by-admin").is_dir());

    app.ctx
        .data
        .destroy(&admin, app.bob.id, created[0].id)
        .await
        .unwrap();
    assert_eq!(app.record_count(&app.bob).await, 0);
}

#[tokio::test]
async fn test_unknown_target_owner() {
    let app = TestApp::new().await;

    let err = app
        .ctx
        .data
        .create(
            &app.admin_identity(),
            9_999,
            ROOT_ID,
            CreatePayload::Directory("nowhere".into()),
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::UserNotFound));

    let err = app
        .ctx
        .data
        .read(&TestApp::identity(&app.alice), 9_999, 1, ReadMode::Info)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));
}

#[tokio::test]
async fn test_unauthenticated_identities_are_denied() {
    let app = TestApp::new().await;

    let stranger = Identity::login("nobody@cloudstore.test");
    let err = app
        .ctx
        .data
        .create(&stranger, app.alice.id, ROOT_ID, CreatePayload::Directory("x".into()))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let reset = Identity::new(&app.alice.email, IssueKind::Other);
    let err = app
        .ctx
        .data
        .create(&reset, app.alice.id, ROOT_ID, CreatePayload::Directory("x".into()))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));
    assert_eq!(app.record_count(&app.alice).await, 0);
}

#[tokio::test]
async fn test_login_token_resolves_to_identity() {
    let app = TestApp::new().await;
    let (token, _) = app.ctx.encoder.issue_login(&app.alice.email).unwrap();

    let identity = app.ctx.identify(&token).unwrap();
    assert_eq!(identity, TestApp::identity(&app.alice));

    let dir = app
        .ctx
        .data
        .create(&identity, app.alice.id, ROOT_ID, CreatePayload::Directory("via-token".into()))
        .await
        .unwrap();
    assert_eq!(dir.len(), 1);

    let (other, _) = app
        .ctx
        .encoder
        .issue(&app.alice.email, IssueKind::Other)
        .unwrap();
    let identity = app.ctx.identify(&other).unwrap();
    assert!(!identity.is_authenticated());

    let err = app.ctx.identify("not-a-token").unwrap_err();
    assert!(err.is(ErrorKind::InvalidCredential));
}
