//! Integration tests for the filesystem object store.
//!
//! Exercise the full asset lifecycle against a temporary media root:
//! credential issuance, direct write, existence/metadata checks, read
//! URLs, and best-effort deletion.

use std::time::Duration;

use lectern_storage::{LocalObjectStore, ObjectStore, UPLOAD_CREDENTIAL_TTL_SECS};

fn store(root: &std::path::Path) -> LocalObjectStore {
    LocalObjectStore::new(
        root.to_path_buf(),
        "http://localhost:8000/media/",
        "/api/v1/assets/upload",
    )
}

#[tokio::test]
async fn ensure_ready_creates_asset_directories() {
    let dir = tempfile::tempdir().unwrap();
    store(dir.path()).ensure_ready().await.unwrap();

    for sub in ["assets/covers", "assets/models", "assets/pages"] {
        assert!(dir.path().join(sub).is_dir(), "{sub} should exist");
    }
}

#[tokio::test]
async fn upload_credential_points_at_upload_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    let cred = store
        .issue_upload_credential("assets/covers/1.jpg", "image/jpeg", 10 * 1024 * 1024)
        .await
        .unwrap();

    assert_eq!(cred.url, "/api/v1/assets/upload");
    assert_eq!(cred.method, "PUT");
    assert_eq!(cred.key, "assets/covers/1.jpg");
    assert_eq!(cred.fields.get("key").unwrap(), "assets/covers/1.jpg");
    assert_eq!(cred.fields.get("Content-Type").unwrap(), "image/jpeg");
    assert_eq!(cred.expires_in_secs, UPLOAD_CREDENTIAL_TTL_SECS);
}

#[tokio::test]
async fn put_then_exists_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    store.ensure_ready().await.unwrap();

    let key = "assets/covers/42.jpg";
    assert!(!store.exists(key).await.unwrap());
    assert!(store.metadata(key).await.unwrap().is_none());

    store
        .put(key, "image/jpeg", b"not really a jpeg".to_vec())
        .await
        .unwrap();

    assert!(store.exists(key).await.unwrap());
    let meta = store.metadata(key).await.unwrap().unwrap();
    assert_eq!(meta.size_bytes, 17);
    assert_eq!(meta.content_type, "image/jpeg");
    assert!(meta.last_modified.is_some());
}

#[tokio::test]
async fn metadata_guesses_model_content_type() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    store
        .put("assets/models/7.glb", "model/gltf-binary", vec![0u8; 16])
        .await
        .unwrap();

    let meta = store.metadata("assets/models/7.glb").await.unwrap().unwrap();
    assert_eq!(meta.content_type, "model/gltf-binary");
}

#[tokio::test]
async fn read_url_is_public_media_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    let url = store
        .issue_read_url("assets/pages/3/1.jpg", Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(url, "http://localhost:8000/media/assets/pages/3/1.jpg");
    assert_eq!(url, store.public_url("assets/pages/3/1.jpg"));
}

#[tokio::test]
async fn delete_is_idempotent_about_missing_objects() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    store
        .put("assets/pages/3/1.jpg", "image/jpeg", vec![1, 2, 3])
        .await
        .unwrap();

    assert!(store.delete("assets/pages/3/1.jpg").await.unwrap());
    assert!(!store.exists("assets/pages/3/1.jpg").await.unwrap());
    // Second delete finds nothing; that is a non-error.
    assert!(!store.delete("assets/pages/3/1.jpg").await.unwrap());
}

#[tokio::test]
async fn delete_failure_surfaces_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    // A directory at the object path makes remove_file fail, standing in
    // for an unreachable object during best-effort cleanup.
    tokio::fs::create_dir_all(dir.path().join("assets/pages/9/1.jpg"))
        .await
        .unwrap();

    assert!(store.delete("assets/pages/9/1.jpg").await.is_err());
}

#[tokio::test]
async fn traversal_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    for key in ["../escape.jpg", "assets/../../etc/passwd", ""] {
        assert!(store.exists(key).await.is_err(), "key {key:?} should be rejected");
        assert!(store.put(key, "image/jpeg", vec![]).await.is_err());
        assert!(store.delete(key).await.is_err());
    }
}
