use thiserror::Error;

// === StoreError ===

/// Errors related to the video bookmark store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entered URL text could not be turned into a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Writing the bookmark list to durable storage failed.
    ///
    /// The in-memory list still holds the mutation that triggered the write.
    #[error("Video store persistence error: {0}")]
    Persistence(String),
    /// Reading or writing the backing key-value store failed.
    #[error("Video store database error: {0}")]
    DatabaseError(String),
}

// === DownloadError ===

/// Errors terminating a download job.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The download URL could not be parsed.
    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),
    /// The server answered with a non-success HTTP status.
    #[error("Invalid server response: HTTP {0}")]
    InvalidResponse(u16),
    /// The audio track could not be extracted or re-encoded.
    #[error("Audio export failed: {0}")]
    ExportFailed(String),
    /// An expected file disappeared before it could be finalized.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// A network error occurred while streaming the response.
    #[error("Download network error: {0}")]
    NetworkError(String),
    /// A file system error occurred.
    #[error("Download file system error: {0}")]
    FileSystemError(String),
    /// Another job is already active on this download manager.
    #[error("A download is already in progress")]
    Busy,
    /// The URL points at content the pipeline refuses to fetch.
    #[error("Download not supported for URL: {0}")]
    Unsupported(String),
}

// === PlaybackError ===

/// Playback failures mapped to user-facing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("This video format is not supported")]
    UnsupportedFormat,
    #[error("No internet connection. Please check your network")]
    NetworkUnreachable,
    #[error("Cannot connect to the server hosting this video")]
    HostUnreachable,
    #[error("The video took too long to load. Check your connection or the URL")]
    Timeout,
    #[error("Access to this video was denied by the server")]
    AccessForbidden,
    #[error("No video was found at this URL")]
    NotFound,
    #[error("The video could not be decoded. Its codec is not supported")]
    DecodeFailed,
    #[error("Media services were reset. Please try again")]
    MediaServicesReset,
    #[error("Playback error: {0}")]
    Other(String),
}

// === ThumbnailError ===

/// Errors related to thumbnail retrieval and caching.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// A network error occurred while fetching the thumbnail.
    #[error("Thumbnail network error: {0}")]
    NetworkError(String),
    /// The server answered with a non-success HTTP status.
    #[error("Thumbnail request failed: HTTP {0}")]
    InvalidResponse(u16),
    /// The fetched payload is not a JPEG image.
    #[error("Thumbnail payload is not a JPEG image")]
    InvalidImage,
    /// The video id contains characters YouTube never uses.
    #[error("Invalid YouTube video id: {0}")]
    InvalidVideoId(String),
    /// Reading or writing the cache directory failed.
    #[error("Thumbnail cache I/O error: {0}")]
    IoError(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
