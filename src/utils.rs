//! Text helpers shared by the scorer, the extractors, and logging.
//!
//! - Diacritic-insensitive normalization for keyword matching
//! - Whitespace collapsing for titles pulled out of HTML
//! - String truncation for log previews

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip diacritical marks and lowercase `text`.
///
/// Vietnamese tone marks and other combining marks are removed after
/// canonical decomposition, so precomposed and decomposed input produce
/// the same output. `đ`/`Đ` carry no decomposition and are mapped to `d`
/// explicitly. Lowercasing runs first so that no combining mark introduced
/// by case mapping survives; this keeps the function idempotent.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("Bóng đá Việt Nam"), "bong da viet nam");
/// ```
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == 'đ' { 'd' } else { c })
        .collect()
}

/// Split normalized `text` into whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalized, de-duplicated query words in first-seen order.
pub fn query_words(query: &str) -> Vec<String> {
    tokenize(query).into_iter().unique().collect()
}

/// Collapse runs of whitespace (including newlines from markup) into one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes, with an ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
