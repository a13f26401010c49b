//! On-disk thumbnail cache.
//!
//! One JPEG per cache key, stored as `<cacheKey>.jpg` in a dedicated
//! directory. Keys come from [`Video::cache_key`](crate::types::video::Video::cache_key).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::services::youtube;
use crate::types::errors::ThumbnailError;
use crate::types::video::YOUTUBE_CACHE_PREFIX;

/// Name of the cache directory under the application data directory.
pub const THUMBNAIL_DIR_NAME: &str = "VideoThumbnails";

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    cache_dir: PathBuf,
}

impl ThumbnailCache {
    /// Creates a cache rooted at `cache_dir`, creating the directory if needed.
    pub fn new<P: Into<PathBuf>>(cache_dir: P) -> Self {
        let cache_dir = cache_dir.into();
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            debug!(dir = %cache_dir.display(), error = %e, "Failed to create thumbnail cache directory");
        }
        Self { cache_dir }
    }

    /// Cache rooted at `<data_dir>/VideoThumbnails`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(THUMBNAIL_DIR_NAME))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `<cache_dir>/<key>.jpg`. Characters outside `A-Z a-z 0-9 - _` become `_`,
    /// so a key can never name a path outside the cache directory.
    pub fn cache_path(&self, cache_key: &str) -> PathBuf {
        let stem: String = cache_key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.jpg", stem))
    }

    pub fn contains(&self, cache_key: &str) -> bool {
        self.cache_path(cache_key).is_file()
    }

    pub fn load(&self, cache_key: &str) -> Option<Vec<u8>> {
        fs::read(self.cache_path(cache_key)).ok()
    }

    pub fn save(&self, cache_key: &str, jpeg: &[u8]) -> Result<PathBuf, ThumbnailError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| ThumbnailError::IoError(e.to_string()))?;
        let path = self.cache_path(cache_key);
        fs::write(&path, jpeg).map_err(|e| ThumbnailError::IoError(e.to_string()))?;
        Ok(path)
    }

    /// Removes a cached thumbnail. Missing files and I/O errors are ignored.
    pub fn delete(&self, cache_key: &str) {
        let path = self.cache_path(cache_key);
        if let Err(e) = fs::remove_file(&path) {
            debug!(path = %path.display(), error = %e, "Thumbnail eviction skipped");
        }
    }

    /// Empties the cache directory, leaving it in place.
    pub fn clear_all(&self) {
        let _ = fs::remove_dir_all(&self.cache_dir);
        let _ = fs::create_dir_all(&self.cache_dir);
    }

    /// Downloads the still for a YouTube video and stores it under `youtube_<id>`.
    ///
    /// `base_url` is normally `https://img.youtube.com`.
    pub async fn fetch_youtube(
        &self,
        client: &reqwest::Client,
        base_url: &str,
        video_id: &str,
    ) -> Result<PathBuf, ThumbnailError> {
        if !youtube::is_valid_video_id(video_id) {
            return Err(ThumbnailError::InvalidVideoId(video_id.to_string()));
        }
        let url = youtube::thumbnail_url(base_url, video_id);
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| ThumbnailError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::InvalidResponse(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ThumbnailError::NetworkError(e.to_string()))?;
        if !body.starts_with(&JPEG_SOI) {
            return Err(ThumbnailError::InvalidImage);
        }

        let key = format!("{}{}", YOUTUBE_CACHE_PREFIX, video_id);
        let path = self.save(&key, &body)?;
        debug!(video_id, path = %path.display(), "Cached YouTube thumbnail");
        Ok(path)
    }
}
