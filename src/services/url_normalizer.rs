//! Cleans up user-entered URL text before it becomes a bookmark.

use url::Url;

use crate::types::errors::StoreError;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

fn has_http_scheme(text: &str) -> bool {
    let lower = text
        .get(..8)
        .unwrap_or(text)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Trims the text, prefixes `https://` when no http(s) scheme is present,
/// and checks that the result parses as a URL.
///
/// Returns the normalized text; the original casing and spelling after the
/// scheme are preserved.
pub fn normalize_url(input: &str) -> Result<String, StoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidUrl("URL is empty".to_string()));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(StoreError::InvalidUrl(format!(
            "URL contains control characters: {:?}",
            trimmed
        )));
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    };

    Url::parse(&candidate).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", candidate, e)))?;
    Ok(candidate)
}
