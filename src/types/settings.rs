use serde::{Deserialize, Serialize};

/// Default size of the write buffer used while streaming a download (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;
/// Assumed size of a download without a declared content length (1 GiB).
pub const DEFAULT_INDETERMINATE_CEILING: u64 = 1024 * 1024 * 1024;
/// Highest fraction reported while the total size is unknown.
pub const DEFAULT_INDETERMINATE_CAP: f64 = 0.9;
pub const DEFAULT_EXPORT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_PLAYBACK_LOAD_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_YOUTUBE_THUMBNAIL_BASE: &str = "https://img.youtube.com";

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    pub downloads: DownloadSettings,
    pub playback: PlaybackSettings,
    pub thumbnails: ThumbnailSettings,
}

/// Download pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadSettings {
    pub buffer_size: usize,
    pub indeterminate_ceiling_bytes: u64,
    pub indeterminate_progress_cap: f64,
    pub export_poll_interval_ms: u64,
    /// Where finished files land. `None` means the platform data directory.
    pub output_dir: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub ffprobe_path: Option<String>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            indeterminate_ceiling_bytes: DEFAULT_INDETERMINATE_CEILING,
            indeterminate_progress_cap: DEFAULT_INDETERMINATE_CAP,
            export_poll_interval_ms: DEFAULT_EXPORT_POLL_INTERVAL_MS,
            output_dir: None,
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }
}

/// Playback behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackSettings {
    pub load_timeout_secs: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            load_timeout_secs: DEFAULT_PLAYBACK_LOAD_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThumbnailSettings {
    pub youtube_base_url: String,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            youtube_base_url: DEFAULT_YOUTUBE_THUMBNAIL_BASE.to_string(),
        }
    }
}
