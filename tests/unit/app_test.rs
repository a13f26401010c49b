//! Unit tests for App wiring: where the database, settings and downloads live.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use video_pocket::app::{database_path, App, DB_FILE_NAME, LIBRARY_DIR_NAME};
use video_pocket::database::connection::Database;
use video_pocket::managers::video_store::{VideoStore, VideoStoreTrait};
use video_pocket::services::kv_store::SqliteKeyValueStore;
use video_pocket::services::thumbnail_cache::ThumbnailCache;
use video_pocket::types::download::DownloadKind;

fn open_app(data_dir: &Path, config: &TempDir) -> App {
    let settings = config.path().join("settings.json").to_string_lossy().to_string();
    App::with_settings_path(data_dir, Some(settings)).expect("Failed to init App")
}

#[test]
fn test_database_lives_in_library_subdir() {
    let data = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let _app = open_app(data.path(), &config);

    assert!(data.path().join(LIBRARY_DIR_NAME).join(DB_FILE_NAME).is_file());
    assert!(!data.path().join(DB_FILE_NAME).exists());
}

/// A download named like the database lands beside it without touching the bookmarks.
#[tokio::test]
async fn test_download_named_like_database_keeps_bookmarks() {
    let data = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let server = MockServer::start().await;
    for name in ["/videopocket.db", "/videopocket.db-wal", "/videopocket.db-shm"] {
        Mock::given(method("GET"))
            .and(path(name))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xAB; 256 * 1024]))
            .mount(&server)
            .await;
    }

    {
        let mut app = open_app(data.path(), &config);
        app.video_store.add_normalized("example.com/a.mp4", "A").unwrap();
        app.video_store.add_normalized("example.com/b.mp4", "B").unwrap();

        for name in ["videopocket.db", "videopocket.db-wal", "videopocket.db-shm"] {
            let url = format!("{}/{}", server.uri(), name);
            let saved = app.download_manager.download(&url, DownloadKind::Video).await.unwrap();
            assert_eq!(saved, data.path().join(name));
        }
        app.video_store.add_normalized("example.com/c.mp4", "C").unwrap();
    }

    let app = open_app(data.path(), &config);
    let titles: Vec<&str> = app.video_store.videos().iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

/// A database at the data dir root from an older layout is moved into `Library/`.
#[test]
fn test_legacy_database_is_relocated() {
    let data = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    {
        let db = Database::open(data.path().join(DB_FILE_NAME)).unwrap();
        let kv = SqliteKeyValueStore::new(Arc::new(db));
        let mut store = VideoStore::new(Box::new(kv), ThumbnailCache::in_data_dir(data.path()));
        store.add_normalized("example.com/old.mp4", "Old").unwrap();
    }

    let app = open_app(data.path(), &config);
    assert_eq!(app.video_store.len(), 1);
    assert!(database_path(data.path()).is_file());
    assert!(!data.path().join(DB_FILE_NAME).exists());
}
