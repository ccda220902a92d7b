//! Utility functions and helpers.

#[cfg(feature = "fetch")]
pub mod http;

/// Values sources print instead of leaving a cell empty.
const PLACEHOLDERS: &[&str] = &["---", "--", "-", "–", "—", "+", "?", "&nbsp;", "\u{a0}"];

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a cell value stands for "no value".
pub fn is_placeholder(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || PLACEHOLDERS.contains(&s)
}

/// Split a list cell on any of `separators`, dropping blanks and placeholders.
pub fn split_list(s: &str, separators: &[char]) -> Vec<String> {
    s.split(|c| separators.contains(&c))
        .map(normalize_whitespace)
        .filter(|part| !is_placeholder(part))
        .collect()
}
