//! File and category name sanitization for the media library.

use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

static CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").expect("valid regex"));

/// Make an uploaded file name safe to store: runs of unsafe characters
/// become `-`, leading dots and dashes are dropped
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = UNSAFE_FILE_CHARS.replace_all(name.trim(), "-");
    let cleaned = replaced.trim_start_matches(['.', '-']);
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Normalized category name, if it is a valid one
pub fn normalize_category(category: &str) -> Option<String> {
    let lowered = category.trim().to_ascii_lowercase();
    CATEGORY.is_match(&lowered).then_some(lowered)
}
