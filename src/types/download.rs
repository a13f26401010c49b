use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Requested output of a download job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadKind {
    /// Keep the fetched media file as-is.
    Video,
    /// Extract the first audio track into a standalone audio container.
    AudioOnly,
}

/// Lifecycle state of the current (or last) download job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadState {
    Idle,
    Fetching,
    Finalizing,
    Succeeded { path: PathBuf },
    Failed { message: String },
}

impl DownloadState {
    pub fn is_active(&self) -> bool {
        matches!(self, DownloadState::Fetching | DownloadState::Finalizing)
    }
}

/// Point-in-time view of a download job, published to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSnapshot {
    pub job_id: Option<Uuid>,
    pub url: Option<String>,
    pub kind: Option<DownloadKind>,
    pub bytes_read: u64,
    pub total_bytes: Option<u64>,
    pub fraction: f64,
    pub state: DownloadState,
}

impl Default for DownloadSnapshot {
    fn default() -> Self {
        Self {
            job_id: None,
            url: None,
            kind: None,
            bytes_read: 0,
            total_bytes: None,
            fraction: 0.0,
            state: DownloadState::Idle,
        }
    }
}

/// Output containers an audio export can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioContainer {
    M4a,
    Mp4,
    Mov,
}

impl AudioContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioContainer::M4a => "m4a",
            AudioContainer::Mp4 => "mp4",
            AudioContainer::Mov => "mov",
        }
    }

    /// Muxer name understood by ffmpeg's `-f` flag.
    pub fn muxer(&self) -> &'static str {
        match self {
            AudioContainer::M4a => "ipod",
            AudioContainer::Mp4 => "mp4",
            AudioContainer::Mov => "mov",
        }
    }
}

/// Encoding presets, in descending order of audio fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    AppleM4a,
    HighestQuality,
    MediumQuality,
    LowQuality,
}

impl ExportPreset {
    /// Preference order used when choosing a preset for an audio export.
    pub const PREFERENCE: [ExportPreset; 4] = [
        ExportPreset::AppleM4a,
        ExportPreset::HighestQuality,
        ExportPreset::MediumQuality,
        ExportPreset::LowQuality,
    ];

    pub fn audio_bitrate(&self) -> &'static str {
        match self {
            ExportPreset::AppleM4a => "256k",
            ExportPreset::HighestQuality => "192k",
            ExportPreset::MediumQuality => "128k",
            ExportPreset::LowQuality => "64k",
        }
    }
}

/// An audio track found inside a media container.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    /// Stream index within the source container.
    pub index: u32,
    pub codec: Option<String>,
    /// Full length of the track, when the container declares it.
    pub duration: Option<Duration>,
}
