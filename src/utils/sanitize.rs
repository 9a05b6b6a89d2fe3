//! Title sanitization for stored links.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes a user-supplied link title.
///
/// HTML tags are removed, runs of whitespace collapse to a single space, and
/// the result is trimmed. Titles are presentation data only; an empty result
/// is stored as-is.
pub fn sanitize_title(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}
