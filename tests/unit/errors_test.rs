use video_pocket::types::errors::*;

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(
        StoreError::InvalidUrl("URL is empty".to_string()).to_string(),
        "Invalid URL: URL is empty"
    );
    assert_eq!(
        StoreError::Persistence("disk full".to_string()).to_string(),
        "Video store persistence error: disk full"
    );
    assert_eq!(
        StoreError::DatabaseError("locked".to_string()).to_string(),
        "Video store database error: locked"
    );
}

#[test]
fn store_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(StoreError::InvalidUrl("x".to_string()));
    assert!(err.source().is_none());
}

// === DownloadError Tests ===

#[test]
fn download_error_display_variants() {
    assert_eq!(
        DownloadError::InvalidResponse(404).to_string(),
        "Invalid server response: HTTP 404"
    );
    assert_eq!(
        DownloadError::ExportFailed("source has no audio track".to_string()).to_string(),
        "Audio export failed: source has no audio track"
    );
    assert_eq!(
        DownloadError::FileNotFound("/tmp/abc".to_string()).to_string(),
        "File not found: /tmp/abc"
    );
    assert_eq!(
        DownloadError::NetworkError("connection reset".to_string()).to_string(),
        "Download network error: connection reset"
    );
    assert_eq!(
        DownloadError::FileSystemError("read-only".to_string()).to_string(),
        "Download file system error: read-only"
    );
    assert_eq!(DownloadError::Busy.to_string(), "A download is already in progress");
}

#[test]
fn download_error_invalid_url_and_unsupported() {
    assert_eq!(
        DownloadError::InvalidUrl("not a url".to_string()).to_string(),
        "Invalid download URL: not a url"
    );
    assert_eq!(
        DownloadError::Unsupported("https://youtu.be/abc".to_string()).to_string(),
        "Download not supported for URL: https://youtu.be/abc"
    );
}

// === PlaybackError Tests ===

#[test]
fn playback_error_messages_are_user_facing() {
    assert_eq!(
        PlaybackError::Timeout.to_string(),
        "The video took too long to load. Check your connection or the URL"
    );
    assert_eq!(
        PlaybackError::AccessForbidden.to_string(),
        "Access to this video was denied by the server"
    );
    assert_eq!(PlaybackError::NotFound.to_string(), "No video was found at this URL");
    assert_eq!(
        PlaybackError::Other("HTTP 500".to_string()).to_string(),
        "Playback error: HTTP 500"
    );
}

#[test]
fn playback_error_is_comparable() {
    assert_eq!(PlaybackError::DecodeFailed, PlaybackError::DecodeFailed.clone());
    assert_ne!(PlaybackError::HostUnreachable, PlaybackError::NetworkUnreachable);
}

// === ThumbnailError Tests ===

#[test]
fn thumbnail_error_display_variants() {
    assert_eq!(
        ThumbnailError::InvalidResponse(503).to_string(),
        "Thumbnail request failed: HTTP 503"
    );
    assert_eq!(
        ThumbnailError::InvalidImage.to_string(),
        "Thumbnail payload is not a JPEG image"
    );
    assert_eq!(
        ThumbnailError::IoError("permission denied".to_string()).to_string(),
        "Thumbnail cache I/O error: permission denied"
    );
    assert_eq!(
        ThumbnailError::InvalidVideoId("a/..".to_string()).to_string(),
        "Invalid YouTube video id: a/.."
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("downloads.nope".to_string()).to_string(),
        "Invalid settings key: downloads.nope"
    );
    assert_eq!(
        SettingsError::InvalidValue("expected u64".to_string()).to_string(),
        "Invalid settings value: expected u64"
    );
    assert_eq!(
        SettingsError::IoError("missing".to_string()).to_string(),
        "Settings I/O error: missing"
    );
}
