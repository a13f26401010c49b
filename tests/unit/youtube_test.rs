//! Unit tests for YouTube URL recognition and the derived URLs.

use rstest::rstest;
use video_pocket::services::youtube::{
    app_url, embed_html, embed_url, extract_video_id, is_valid_video_id, is_youtube_url, thumbnail_url,
    web_url,
};

#[rstest]
#[case("https://www.youtube.com/watch?v=abc123", true)]
#[case("https://youtu.be/abc123", true)]
#[case("https://www.youtube.com/embed/abc123", true)]
#[case("https://www.youtube.com/v/abc123", true)]
#[case("https://m.youtube.com/watch?v=abc123", true)]
#[case("https://example.com/video.mp4", false)]
#[case("https://www.youtube.com/", false)]
#[case("https://vimeo.com/12345", false)]
fn classifies_urls(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(is_youtube_url(url), expected);
}

#[rstest]
#[case("https://www.youtube.com/watch?v=abc123", Some("abc123"))]
#[case("https://www.youtube.com/watch?feature=share&v=abc123&t=10", Some("abc123"))]
#[case("https://youtu.be/abc123?t=5", Some("abc123"))]
#[case("https://youtube.com/embed/abc123", Some("abc123"))]
#[case("https://www.youtube.com/v/abc123&hl=en", Some("abc123"))]
#[case("https://youtu.be/", None)]
#[case("https://www.youtube.com/watch?v=", None)]
#[case("https://example.com/video.mp4", None)]
fn extracts_video_ids(#[case] url: &str, #[case] expected: Option<&str>) {
    assert_eq!(extract_video_id(url).as_deref(), expected);
}

#[rstest]
#[case("dQw4w9WgXcQ", true)]
#[case("abc-_123", true)]
#[case("", false)]
#[case("a/../../x", false)]
#[case("abc 123", false)]
#[case("abc#t=5", false)]
fn validates_video_ids(#[case] id: &str, #[case] expected: bool) {
    assert_eq!(is_valid_video_id(id), expected);
}

/// The heuristic is substring-based: a pattern inside a query string counts.
#[test]
fn substring_heuristic_matches_embedded_pattern() {
    assert!(is_youtube_url("https://example.com/?next=youtu.be/abc"));
}

#[test]
fn derived_urls() {
    assert_eq!(
        embed_url("abc123"),
        "https://www.youtube.com/embed/abc123?playsinline=1&autoplay=1"
    );
    assert_eq!(app_url("abc123"), "youtube://watch?v=abc123");
    assert_eq!(web_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    assert_eq!(
        thumbnail_url("https://img.youtube.com/", "abc123"),
        "https://img.youtube.com/vi/abc123/0.jpg"
    );
}

#[test]
fn embed_html_wraps_embed_url() {
    let html = embed_html("abc123");
    assert!(html.contains("<iframe"));
    assert!(html.contains("https://www.youtube.com/embed/abc123?playsinline=1&autoplay=1"));
}
