use std::sync::Arc;
use tempfile::tempdir;
use tinylink::domain::entities::NewLink;
use tinylink::domain::error::StoreError;
use tinylink::domain::repositories::LinkRepository;
use tinylink::infrastructure::persistence::{KvStore, MemoryLinkRepository};

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("links.json");

    let first = Arc::new(KvStore::new());
    let repo = MemoryLinkRepository::new(first.clone());
    repo.insert(NewLink::new("keep0001", "https://example.com/keep", "alice"))
        .await
        .unwrap();
    repo.insert(NewLink::new("keep0002", "https://example.com/also", "bob"))
        .await
        .unwrap();
    assert_eq!(first.save_to_file(&path).unwrap(), 2);

    let second = Arc::new(KvStore::new());
    assert_eq!(second.load_from_file(&path).unwrap(), 2);
    let restored = MemoryLinkRepository::new(second);

    assert_eq!(
        restored.resolve("keep0001").await.unwrap(),
        "https://example.com/keep"
    );
    assert_eq!(
        restored.lookup_id_by_url("https://example.com/also").await.unwrap(),
        "keep0002"
    );
}

#[tokio::test]
async fn test_restored_urls_are_still_unique() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("links.json");
    std::fs::write(&path, r#"{"abc12345": "https://example.com/x"}"#).unwrap();

    let store = Arc::new(KvStore::new());
    store.load_from_file(&path).unwrap();
    let repo = MemoryLinkRepository::new(store);

    let result = repo
        .insert(NewLink::new("other001", "https://example.com/x", "alice"))
        .await;

    assert!(matches!(result, Err(StoreError::DuplicateUrl)));
}

#[tokio::test]
async fn test_missing_snapshot_starts_empty() {
    let dir = tempdir().unwrap();
    let store = KvStore::new();

    assert_eq!(store.load_from_file(dir.path().join("absent.json")).unwrap(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_malformed_snapshot_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let store = KvStore::new();

    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Snapshot(_))
    ));
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/deeper/links.json");

    let store = KvStore::new();
    store.set("nest0001", "https://example.com/nested");

    assert_eq!(store.save_to_file(&path).unwrap(), 1);
    assert!(path.exists());
}

#[tokio::test]
async fn test_deleted_link_stays_unreachable_after_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("links.json");

    let first = Arc::new(KvStore::new());
    let repo = MemoryLinkRepository::new(first.clone());
    repo.insert(NewLink::new("old00001", "https://example.com/x", "alice"))
        .await
        .unwrap();
    repo.soft_delete(&["old00001".to_string()], "alice")
        .await
        .unwrap();
    repo.insert(NewLink::new("new00001", "https://example.com/x", "alice"))
        .await
        .unwrap();
    first.save_to_file(&path).unwrap();

    let second = Arc::new(KvStore::new());
    assert_eq!(second.load_from_file(&path).unwrap(), 1);
    let restored = MemoryLinkRepository::new(second);

    assert!(matches!(
        restored.resolve("old00001").await,
        Err(StoreError::NotFound)
    ));
    assert_eq!(
        restored.resolve("new00001").await.unwrap(),
        "https://example.com/x"
    );
    assert_eq!(
        restored.lookup_id_by_url("https://example.com/x").await.unwrap(),
        "new00001"
    );

    let stats = restored.count_active().await.unwrap();
    assert_eq!(stats.urls, 1);
    assert_eq!(stats.users, 0);
}
