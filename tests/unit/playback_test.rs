//! Unit tests for playback routing and load supervision.

use std::time::Duration;

use rstest::rstest;
use tokio::sync::watch;

use video_pocket::services::playback::{await_ready, PlaybackTarget, PlayerStatus};
use video_pocket::types::errors::PlaybackError;

#[test]
fn test_youtube_urls_route_to_embed() {
    let target = PlaybackTarget::for_url("https://youtu.be/abc123?t=5");
    assert_eq!(
        target,
        PlaybackTarget::YouTube {
            video_id: "abc123".to_string(),
            embed_url: "https://www.youtube.com/embed/abc123?playsinline=1&autoplay=1".to_string(),
            app_url: "youtube://watch?v=abc123".to_string(),
            web_url: "https://www.youtube.com/watch?v=abc123".to_string(),
        }
    );
    assert!(!target.allows_download());
}

#[test]
fn test_other_urls_play_natively() {
    let target = PlaybackTarget::for_url("https://example.com/clip.mp4");
    assert_eq!(
        target,
        PlaybackTarget::Native {
            url: "https://example.com/clip.mp4".to_string()
        }
    );
    assert!(target.allows_download());
}

/// A YouTube-looking URL without an extractable id falls back to native playback.
#[test]
fn test_youtube_without_id_plays_natively() {
    let target = PlaybackTarget::for_url("https://m.youtube.com/");
    assert!(matches!(target, PlaybackTarget::Native { .. }));
}

#[test]
fn test_target_serializes_with_kind_tag() {
    let json = serde_json::to_value(PlaybackTarget::for_url("https://youtu.be/abc")).unwrap();
    assert_eq!(json["kind"], "youtube");
    assert_eq!(json["video_id"], "abc");
}

#[tokio::test]
async fn test_await_ready_resolves_when_ready() {
    let (tx, rx) = watch::channel(PlayerStatus::Loading);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = tx.send(PlayerStatus::Ready);
    });
    assert_eq!(await_ready(rx, Duration::from_secs(2)).await, Ok(()));
}

#[tokio::test]
async fn test_await_ready_propagates_player_error() {
    let (tx, rx) = watch::channel(PlayerStatus::Loading);
    tx.send(PlayerStatus::Failed(PlaybackError::DecodeFailed)).unwrap();
    assert_eq!(
        await_ready(rx, Duration::from_secs(2)).await,
        Err(PlaybackError::DecodeFailed)
    );
}

#[tokio::test]
async fn test_await_ready_times_out() {
    let (_tx, rx) = watch::channel(PlayerStatus::Loading);
    assert_eq!(
        await_ready(rx, Duration::from_millis(20)).await,
        Err(PlaybackError::Timeout)
    );
}

#[tokio::test]
async fn test_await_ready_player_dropped() {
    let (tx, rx) = watch::channel(PlayerStatus::Loading);
    drop(tx);
    let result = await_ready(rx, Duration::from_secs(2)).await;
    assert!(matches!(result, Err(PlaybackError::Other(_))));
}

#[rstest]
#[case(401, PlaybackError::AccessForbidden)]
#[case(403, PlaybackError::AccessForbidden)]
#[case(404, PlaybackError::NotFound)]
#[case(410, PlaybackError::NotFound)]
#[case(408, PlaybackError::Timeout)]
#[case(415, PlaybackError::UnsupportedFormat)]
#[case(500, PlaybackError::Other("HTTP 500".to_string()))]
fn test_status_mapping(#[case] status: u16, #[case] expected: PlaybackError) {
    assert_eq!(PlaybackError::from_http_status(status), expected);
}

/// Connection failures map to HostUnreachable.
#[tokio::test]
async fn test_connect_error_maps_to_host_unreachable() {
    // Port 9 on localhost is the discard port; nothing listens in test environments.
    let err = reqwest::Client::new()
        .get("http://127.0.0.1:9/clip.mp4")
        .send()
        .await
        .unwrap_err();
    assert_eq!(PlaybackError::from_reqwest(&err), PlaybackError::HostUnreachable);
}
