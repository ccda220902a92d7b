//! Previous/current value detection in table cells.
//!
//! Schedules show a changed subject, room or teacher by striking the old
//! value through and writing the new one next to it. Adapters keep a cell's
//! inner markup so the struck part can be recovered here. Plain-text forms
//! are understood as well: "Ma?De" and "Ma → De" (old, new), "(Ma)" (old
//! only) and placeholders such as "---" (nothing).

use scraper::{ElementRef, Html, Node};

use crate::utils::{is_placeholder, normalize_whitespace};

const STRIKE_TAGS: &[&str] = &["s", "strike", "del"];
const ARROWS: &[&str] = &["→", "->", "=>", "⇒"];

/// A cell split into its old and new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangedValue {
    pub previous: Option<String>,
    pub current: Option<String>,
}

impl ChangedValue {
    /// The old value is shown but nothing replaces it.
    pub fn is_struck_without_replacement(&self) -> bool {
        self.previous.is_some() && self.current.is_none()
    }
}

/// Split a raw cell into previous and current value.
pub fn parse_changed_value(raw: &str) -> ChangedValue {
    if has_markup(raw) {
        let (struck, plain) = split_struck(raw);
        if struck.is_some() {
            return ChangedValue {
                previous: struck,
                current: plain,
            };
        }
        return parse_plain(&plain.unwrap_or_default());
    }
    parse_plain(raw)
}

/// Cell text with markup removed and whitespace collapsed.
pub fn plain_text(raw: &str) -> String {
    if !has_markup(raw) {
        return normalize_whitespace(raw);
    }
    let fragment = Html::parse_fragment(raw);
    let text: Vec<&str> = fragment.root_element().text().collect();
    normalize_whitespace(&text.join(" "))
}

/// Cell text as an optional value: placeholders and blanks become `None`.
pub fn value_of(raw: &str) -> Option<String> {
    let text = plain_text(raw);
    (!is_placeholder(&text)).then_some(text)
}

fn has_markup(raw: &str) -> bool {
    raw.contains('<') || raw.contains('&')
}

/// Collect struck and plain text nodes separately.
fn split_struck(raw: &str) -> (Option<String>, Option<String>) {
    let fragment = Html::parse_fragment(raw);
    let mut struck = Vec::new();
    let mut plain = Vec::new();

    for node in fragment.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let is_struck = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(is_strike_element);
        if is_struck {
            struck.push(text.to_string());
        } else {
            plain.push(text.to_string());
        }
    }

    (joined_value(&struck), joined_value(&plain))
}

fn is_strike_element(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if STRIKE_TAGS.contains(&value.name()) {
        return true;
    }
    value
        .attr("style")
        .is_some_and(|style| style.replace(' ', "").to_lowercase().contains("line-through"))
}

fn joined_value(parts: &[String]) -> Option<String> {
    let text = normalize_whitespace(&parts.join(" "));
    (!is_placeholder(&text)).then_some(text)
}

fn parse_plain(raw: &str) -> ChangedValue {
    let text = normalize_whitespace(raw);
    if is_placeholder(&text) {
        return ChangedValue::default();
    }

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        if !inner.contains(['(', ')']) {
            return ChangedValue {
                previous: non_placeholder(inner),
                current: None,
            };
        }
    }

    for separator in ARROWS.iter().copied().chain(std::iter::once("?")) {
        if let Some((before, after)) = text.split_once(separator) {
            let previous = non_placeholder(before);
            let current = non_placeholder(after);
            // a trailing "?" alone is part of the value
            if separator == "?" && (previous.is_none() || current.is_none()) {
                continue;
            }
            return ChangedValue { previous, current };
        }
    }

    ChangedValue {
        previous: None,
        current: Some(text),
    }
}

fn non_placeholder(text: &str) -> Option<String> {
    let text = normalize_whitespace(text);
    (!is_placeholder(&text)).then_some(text)
}
