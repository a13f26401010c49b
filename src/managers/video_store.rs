//! Video Store for Video Pocket.
//!
//! Holds the ordered bookmark list in memory and writes the whole list to a
//! key-value store after every mutation. Deleting a bookmark evicts its
//! cached thumbnail unless another bookmark still maps to the same cache key.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::kv_store::KeyValueStore;
use crate::services::thumbnail_cache::ThumbnailCache;
use crate::services::url_normalizer::normalize_url;
use crate::types::errors::StoreError;
use crate::types::video::Video;

/// Storage key of the serialized bookmark list.
pub const SAVE_KEY: &str = "SavedVideos";

/// Trait defining video bookmark operations.
pub trait VideoStoreTrait {
    fn add_video(&mut self, url_string: &str, title: &str) -> Result<Video, StoreError>;
    fn add_normalized(&mut self, input: &str, title: &str) -> Result<Video, StoreError>;
    fn remove_video(&mut self, id: &Uuid) -> Result<bool, StoreError>;
    fn remove_videos(&mut self, indices: &[usize]) -> Result<usize, StoreError>;
    fn videos(&self) -> &[Video];
    fn get(&self, id: &Uuid) -> Option<&Video>;
}

/// In-memory bookmark list persisted through a [`KeyValueStore`].
///
/// A failed write is reported as [`StoreError::Persistence`], but the
/// in-memory list keeps the change and stays authoritative for the session.
pub struct VideoStore {
    kv: Box<dyn KeyValueStore>,
    thumbnails: ThumbnailCache,
    videos: Vec<Video>,
}

impl VideoStore {
    /// Creates a store and loads any previously persisted list.
    pub fn new(kv: Box<dyn KeyValueStore>, thumbnails: ThumbnailCache) -> Self {
        let mut store = Self {
            kv,
            thumbnails,
            videos: Vec::new(),
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let data = match self.kv.get(SAVE_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not read saved videos, starting empty");
                return;
            }
        };

        match serde_json::from_slice::<Vec<Video>>(&data) {
            Ok(videos) => {
                info!(count = videos.len(), "Loaded saved videos");
                self.videos = videos;
            }
            Err(e) => warn!(error = %e, "Saved videos are unreadable, starting empty"),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(&self.videos)
            .map_err(|e| StoreError::Persistence(format!("Failed to encode videos: {}", e)))?;
        self.kv
            .set(SAVE_KEY, &encoded)
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }

    /// Evicts thumbnails of removed videos whose key no remaining video shares.
    fn evict_thumbnails(&self, removed: &[Video]) {
        let keys: BTreeSet<String> = removed.iter().map(Video::cache_key).collect();
        for key in keys {
            if self.videos.iter().any(|v| v.cache_key() == key) {
                debug!(cache_key = %key, "Thumbnail still referenced, keeping it");
                continue;
            }
            self.thumbnails.delete(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }
}

impl VideoStoreTrait for VideoStore {
    /// Appends a new bookmark. No URL validation happens here.
    fn add_video(&mut self, url_string: &str, title: &str) -> Result<Video, StoreError> {
        let video = Video::new(url_string, title);
        self.videos.push(video.clone());
        debug!(id = %video.id, url = %video.url_string, "Added video");
        self.persist()?;
        Ok(video)
    }

    /// Normalizes user-entered URL text, then adds it.
    fn add_normalized(&mut self, input: &str, title: &str) -> Result<Video, StoreError> {
        let url_string = normalize_url(input)?;
        self.add_video(&url_string, title)
    }

    /// Removes a bookmark by id. Returns false, without persisting, if it was absent.
    fn remove_video(&mut self, id: &Uuid) -> Result<bool, StoreError> {
        let Some(index) = self.videos.iter().position(|v| &v.id == id) else {
            return Ok(false);
        };
        let removed = self.videos.remove(index);
        self.evict_thumbnails(std::slice::from_ref(&removed));
        self.persist()?;
        Ok(true)
    }

    /// Removes the bookmarks at the given list positions.
    ///
    /// Out-of-range and repeated indices are ignored. Returns how many were removed.
    fn remove_videos(&mut self, indices: &[usize]) -> Result<usize, StoreError> {
        let valid: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.videos.len())
            .collect();
        if valid.is_empty() {
            return Ok(0);
        }

        let removed: Vec<Video> = valid
            .iter()
            .rev()
            .map(|&i| self.videos.remove(i))
            .collect();
        self.evict_thumbnails(&removed);
        self.persist()?;
        Ok(removed.len())
    }

    fn videos(&self) -> &[Video] {
        &self.videos
    }

    fn get(&self, id: &Uuid) -> Option<&Video> {
        self.videos.iter().find(|v| &v.id == id)
    }
}
