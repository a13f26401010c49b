use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::youtube;

/// Prefix of thumbnail cache keys derived from a YouTube video id.
pub const YOUTUBE_CACHE_PREFIX: &str = "youtube_";

/// A saved reference to a remote video URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "urlString")]
    pub url_string: String,
    #[serde(rename = "dateAdded")]
    pub date_added: DateTime<Utc>,
}

impl Video {
    /// Creates a record with a fresh id and the current timestamp.
    ///
    /// A blank title falls back to the URL text.
    pub fn new(url_string: &str, title: &str) -> Self {
        let title = if title.trim().is_empty() { url_string } else { title };
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            url_string: url_string.to_string(),
            date_added: Utc::now(),
        }
    }

    pub fn is_youtube(&self) -> bool {
        youtube::is_youtube_url(&self.url_string)
    }

    /// Key under which this video's thumbnail is cached.
    ///
    /// Bookmarks for the same YouTube video share a key; everything else is
    /// keyed by the bookmark id.
    pub fn cache_key(&self) -> String {
        if self.is_youtube() {
            if let Some(video_id) = youtube::extract_video_id(&self.url_string) {
                return format!("{}{}", YOUTUBE_CACHE_PREFIX, video_id);
            }
        }
        self.id.to_string()
    }
}
