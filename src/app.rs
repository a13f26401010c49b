//! App Core for Video Pocket.
//!
//! Central struct holding the database, settings, bookmark store and download
//! pipeline, wired together for the RPC bridge.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::database::connection::Database;
use crate::managers::download_manager::{DownloadConfig, DownloadManager};
use crate::managers::video_store::VideoStore;
use crate::services::audio_export::{AudioExporter, FfmpegExporter, UnavailableExporter};
use crate::services::kv_store::SqliteKeyValueStore;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::thumbnail_cache::ThumbnailCache;
use crate::types::settings::DownloadSettings;

/// File name of the SQLite database.
pub const DB_FILE_NAME: &str = "videopocket.db";

/// Private subdirectory of the data dir holding the database. Downloads land
/// in the data dir itself, so nothing a download can be named collides with it.
pub const LIBRARY_DIR_NAME: &str = "Library";

/// Where the database lives for a given data dir.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LIBRARY_DIR_NAME).join(DB_FILE_NAME)
}

/// Moves a database left at the data dir root by older builds into `Library/`.
fn relocate_legacy_database(data_dir: &Path, db_path: &Path) {
    let legacy = data_dir.join(DB_FILE_NAME);
    if !legacy.is_file() || db_path.exists() {
        return;
    }
    let with_suffix = |path: &Path, suffix: &str| {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    };
    for suffix in ["", "-wal", "-shm"] {
        let from = with_suffix(&legacy, suffix);
        if !from.is_file() {
            continue;
        }
        let to = with_suffix(db_path, suffix);
        match std::fs::rename(&from, &to) {
            Ok(()) => info!(from = %from.display(), to = %to.display(), "Relocated database"),
            Err(e) => warn!(from = %from.display(), error = %e, "Failed to relocate database"),
        }
    }
}

/// Picks the audio export backend: configured binaries first, then `PATH`.
pub fn select_exporter(settings: &DownloadSettings) -> Arc<dyn AudioExporter> {
    if let (Some(ffmpeg), Some(ffprobe)) = (&settings.ffmpeg_path, &settings.ffprobe_path) {
        return Arc::new(FfmpegExporter::new(ffmpeg.into(), ffprobe.into()));
    }
    match FfmpegExporter::from_path() {
        Some(exporter) => Arc::new(exporter),
        None => {
            warn!("ffmpeg/ffprobe not found, audio-only downloads are disabled");
            Arc::new(UnavailableExporter)
        }
    }
}

/// Central application struct holding all managers and services.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
    pub video_store: VideoStore,
    pub download_manager: DownloadManager,
    pub http: reqwest::Client,
    data_dir: PathBuf,
    events: mpsc::UnboundedSender<Value>,
    event_rx: Option<mpsc::UnboundedReceiver<Value>>,
}

impl App {
    /// Creates a new App rooted at `data_dir`, with settings at the platform config path.
    pub fn new(data_dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_settings_path(data_dir, None)
    }

    /// Like [`App::new`], reading settings from `settings_path` when given.
    pub fn with_settings_path(
        data_dir: &Path,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = database_path(data_dir);
        if let Some(library) = db_path.parent() {
            std::fs::create_dir_all(library)?;
        }
        relocate_legacy_database(data_dir, &db_path);
        let db = Arc::new(Database::open(&db_path)?);

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            warn!(error = %e, "Settings could not be loaded, using defaults");
        }

        let thumbnails = ThumbnailCache::in_data_dir(data_dir);
        let video_store = VideoStore::new(Box::new(SqliteKeyValueStore::new(db.clone())), thumbnails);
        let download_manager = Self::build_download_manager(&settings_engine, data_dir);

        let (events, event_rx) = mpsc::unbounded_channel();

        info!(data_dir = %data_dir.display(), videos = video_store.len(), "Video Pocket ready");

        Ok(Self {
            db,
            settings_engine,
            video_store,
            download_manager,
            http: reqwest::Client::new(),
            data_dir: data_dir.to_path_buf(),
            events,
            event_rx: Some(event_rx),
        })
    }

    fn build_download_manager(settings_engine: &SettingsEngine, data_dir: &Path) -> DownloadManager {
        let settings = &settings_engine.get_settings().downloads;
        DownloadManager::new(
            DownloadConfig::from_settings(settings, data_dir),
            select_exporter(settings),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        self.video_store.thumbnails()
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.settings_engine.get_settings().playback.load_timeout_secs)
    }

    /// Sender for asynchronous event lines (e.g. `download.finished`).
    pub fn event_sender(&self) -> mpsc::UnboundedSender<Value> {
        self.events.clone()
    }

    /// Hands the event stream to its single consumer. Returns `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<Value>> {
        self.event_rx.take()
    }

    /// Rebuilds the download pipeline from the current settings.
    ///
    /// Returns false, leaving the old pipeline in place, while a job is active.
    pub fn reload_downloads(&mut self) -> bool {
        if self.download_manager.is_busy() {
            return false;
        }
        self.download_manager = Self::build_download_manager(&self.settings_engine, &self.data_dir);
        true
    }
}
