//! Playback routing and load supervision.
//!
//! Decides whether a bookmark plays natively or through the YouTube embed,
//! and bounds how long a player may take to become ready.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::services::youtube;
use crate::types::errors::PlaybackError;
use crate::types::settings::DEFAULT_PLAYBACK_LOAD_TIMEOUT_SECS;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(DEFAULT_PLAYBACK_LOAD_TIMEOUT_SECS);

/// How a bookmark should be played.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackTarget {
    /// Streams play directly in the native player and may be downloaded.
    Native { url: String },
    /// YouTube serves protected streams: offer the web embed, the app, or the browser.
    #[serde(rename = "youtube")]
    YouTube {
        video_id: String,
        embed_url: String,
        app_url: String,
        web_url: String,
    },
}

impl PlaybackTarget {
    pub fn for_url(url_string: &str) -> Self {
        if youtube::is_youtube_url(url_string) {
            if let Some(video_id) = youtube::extract_video_id(url_string) {
                return PlaybackTarget::YouTube {
                    embed_url: youtube::embed_url(&video_id),
                    app_url: youtube::app_url(&video_id),
                    web_url: youtube::web_url(&video_id),
                    video_id,
                };
            }
        }
        PlaybackTarget::Native {
            url: url_string.to_string(),
        }
    }

    /// Whether the download pipeline is offered for this target.
    pub fn allows_download(&self) -> bool {
        matches!(self, PlaybackTarget::Native { .. })
    }
}

/// Readiness reported by a player while it loads a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerStatus {
    Loading,
    Ready,
    Failed(PlaybackError),
}

/// Waits until the player leaves `Loading`, failing with
/// [`PlaybackError::Timeout`] once `load_timeout` elapses.
pub async fn await_ready(
    mut status: watch::Receiver<PlayerStatus>,
    load_timeout: Duration,
) -> Result<(), PlaybackError> {
    let waited = tokio::time::timeout(
        load_timeout,
        status.wait_for(|s| !matches!(s, PlayerStatus::Loading)),
    )
    .await;

    match waited {
        Err(_) => Err(PlaybackError::Timeout),
        Ok(Err(_)) => Err(PlaybackError::Other("player closed before becoming ready".to_string())),
        Ok(Ok(current)) => match &*current {
            PlayerStatus::Ready => Ok(()),
            PlayerStatus::Failed(e) => Err(e.clone()),
            PlayerStatus::Loading => Err(PlaybackError::Timeout),
        },
    }
}

impl PlaybackError {
    /// Maps an HTTP status returned while opening a stream.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => PlaybackError::AccessForbidden,
            404 | 410 => PlaybackError::NotFound,
            408 | 504 => PlaybackError::Timeout,
            415 => PlaybackError::UnsupportedFormat,
            other => PlaybackError::Other(format!("HTTP {}", other)),
        }
    }

    /// Maps a transport error raised while opening a stream.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            PlaybackError::Timeout
        } else if let Some(status) = err.status() {
            Self::from_http_status(status.as_u16())
        } else if err.is_connect() {
            PlaybackError::HostUnreachable
        } else if err.is_decode() || err.is_body() {
            PlaybackError::DecodeFailed
        } else {
            PlaybackError::NetworkUnreachable
        }
    }
}
