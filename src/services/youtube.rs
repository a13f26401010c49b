//! YouTube URL recognition.
//!
//! Classification is a substring heuristic, not a URL-grammar parse: a
//! non-YouTube URL that carries one of the patterns in, say, a query
//! parameter is classified as YouTube too.

use url::Url;

const YOUTUBE_PATTERNS: [&str; 5] = [
    "youtube.com/watch",
    "youtu.be/",
    "youtube.com/embed/",
    "youtube.com/v/",
    "m.youtube.com",
];

/// Path markers followed directly by a video id, tried in order.
const ID_PATH_MARKERS: [&str; 3] = ["youtu.be/", "youtube.com/embed/", "youtube.com/v/"];

/// Returns true if the text looks like a YouTube video URL.
pub fn is_youtube_url(url_string: &str) -> bool {
    YOUTUBE_PATTERNS.iter().any(|p| url_string.contains(p))
}

/// Extracts the video id from a YouTube URL.
///
/// Tries the `v` query parameter first, then the path forms
/// `youtu.be/<id>`, `youtube.com/embed/<id>` and `youtube.com/v/<id>`,
/// cutting the id at the first `?` or `&`.
pub fn extract_video_id(url_string: &str) -> Option<String> {
    if let Ok(url) = Url::parse(url_string) {
        let from_query = url
            .query_pairs()
            .find(|(name, _)| name == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty());
        if from_query.is_some() {
            return from_query;
        }
    }

    ID_PATH_MARKERS.iter().find_map(|marker| {
        let (_, rest) = url_string.split_once(marker)?;
        let id = rest.split(['?', '&']).next().unwrap_or_default();
        (!id.is_empty()).then(|| id.to_string())
    })
}

/// True for ids made only of the characters YouTube uses (`A-Z a-z 0-9 - _`).
pub fn is_valid_video_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}?playsinline=1&autoplay=1", video_id)
}

/// Deep link opening the video in the YouTube app.
pub fn app_url(video_id: &str) -> String {
    format!("youtube://watch?v={}", video_id)
}

pub fn web_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Highest-quality still for a video, relative to `base` (normally `https://img.youtube.com`).
pub fn thumbnail_url(base: &str, video_id: &str) -> String {
    format!("{}/vi/{}/0.jpg", base.trim_end_matches('/'), video_id)
}

/// Minimal HTML page embedding the inline player for a web view.
pub fn embed_html(video_id: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no">
<style>
  html, body {{ margin: 0; padding: 0; background: #000; height: 100%; }}
  iframe {{ position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0; }}
</style>
</head>
<body>
<iframe src="{}" allow="autoplay; encrypted-media; picture-in-picture" allowfullscreen></iframe>
</body>
</html>
"#,
        embed_url(video_id)
    )
}
