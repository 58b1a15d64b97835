use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Canonicalize body text: collapse whitespace, strip punctuation, trim, lowercase.
///
/// This normalized form is the single representation fed to both the metric
/// extractor and the duplicate matcher, so both stages measure the same text.
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let stripped = NON_WORD_RE.replace_all(&collapsed, "");
    stripped.trim().to_lowercase()
}

// ── Tests ──
