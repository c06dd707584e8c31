//! Utility functions for text cleanup, truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Markup stripping for titles and snippets returned by news sources
//! - Character-safe truncation for snippets and log previews
//! - Slugification for snapshot file names
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").expect("tag regex"));

/// Remove angle-bracket tags and decode HTML entities.
///
/// News APIs wrap matched keywords in `<b>` tags and escape quotes as
/// `&quot;`; both are removed so the text can be matched and displayed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_markup("<b>금리</b> 인상 &quot;우려&quot;"), "금리 인상 \"우려\"");
/// ```
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(text, "");
    html_escape::decode_html_entities(&without_tags)
        .trim()
        .to_string()
}

/// Keep the first `max` characters of `s`, appending `suffix` when anything was cut.
///
/// Counts `char`s, not bytes, so multi-byte Hangul is never split.
pub fn truncate_chars(s: &str, max: usize, suffix: &str) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{}", &s[..idx], suffix),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// character count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        truncate_chars(s, max, &format!("…(+{} chars)", total - max))
    }
}

/// Convert a keyword to a file-name friendly slug.
///
/// Lowercases, drops everything but alphanumerics, spaces and hyphens, then
/// replaces spaces with hyphens. Hangul counts as alphanumeric.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Samsung Electronics"), "samsung-electronics");
/// assert_eq!(slugify("삼성전자!"), "삼성전자");
/// ```
pub fn slugify(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("<b>금리</b> 인상 &quot;우려&quot;"),
            "금리 인상 \"우려\""
        );
        assert_eq!(strip_markup("plain"), "plain");
        assert_eq!(strip_markup("  <p>padded</p> "), "padded");
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("가나다라마", 3, "..."), "가나다...");
        assert_eq!(truncate_chars("가나", 3, "..."), "가나");
        assert_eq!(truncate_chars("abc", 3, "..."), "abc");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Samsung Electronics"), "samsung-electronics");
        assert_eq!(slugify("삼성전자!"), "삼성전자");
        assert_eq!(slugify(" AI 반도체 "), "ai-반도체");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        let path = nested.to_str().unwrap();
        ensure_writable_dir(path).await.unwrap();
        assert!(nested.is_dir());
    }
}
