//! Link extraction from free-text submissions
//!
//! Share sheets wrap post links in prose ("check this out https://... nice"),
//! so the relay takes the first http(s) token and ignores the rest.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"https?://[^\s"']+"#).expect("URL pattern is valid")
});

/// Return the first `http://` or `https://` link in `text`
///
/// A link runs until the first whitespace or quote character. `None` means
/// the text carries no link; it is never an error.
pub fn extract_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}
