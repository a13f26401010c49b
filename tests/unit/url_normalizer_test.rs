//! Unit tests for URL normalization of user-entered text.

use rstest::rstest;
use video_pocket::services::url_normalizer::normalize_url;
use video_pocket::types::errors::StoreError;

#[rstest]
#[case("example.com/video.mp4", "https://example.com/video.mp4")]
#[case("  example.com  ", "https://example.com")]
#[case("http://example.com/a.mp4", "http://example.com/a.mp4")]
#[case("https://example.com/a.mp4", "https://example.com/a.mp4")]
#[case("HTTPS://Example.com/A.mp4", "HTTPS://Example.com/A.mp4")]
#[case("www.youtube.com/watch?v=abc", "https://www.youtube.com/watch?v=abc")]
fn normalizes_user_text(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize_url(input).unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("    ")]
#[case("\t\n")]
#[case("exa\u{0007}mple.com")]
#[case("https://")]
fn rejects_invalid_text(#[case] input: &str) {
    let err = normalize_url(input).unwrap_err();
    assert!(matches!(err, StoreError::InvalidUrl(_)), "unexpected error: {:?}", err);
}

/// A non-http scheme is not recognized, so the text gets an https:// prefix
/// and must then parse as a host.
#[test]
fn other_schemes_are_prefixed() {
    let normalized = normalize_url("ftp.example.com/file").unwrap();
    assert_eq!(normalized, "https://ftp.example.com/file");
}
