//! Public URLs of uploaded media.

use url::Url;

/// Shown wherever a record has no image.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=No+Image";

/// Resolve a stored media path against `storage_base`.
///
/// Absolute `http(s)` URLs pass through unchanged; relative paths are joined
/// with exactly one slash.
#[must_use]
pub fn storage_url(storage_base: &Url, path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        storage_base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
