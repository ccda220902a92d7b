//! Class designator expansion.
//!
//! Raw class cells come in many shapes: "5a, 5b", "5abcde", "8ab9abc",
//! "07 [A,B,C]", bare grades ("7"), grade ranges ("5-12") and school specific
//! range notations such as "7A-C" that a [`ClassRangeConfig`] describes.
//! [`ClassSetResolver::resolve`] turns any of them into a set of canonical
//! class names.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::ClassRangeConfig;
use crate::utils::{is_placeholder, normalize_whitespace};

/// A [`ClassRangeConfig`] turned into a matcher.
#[derive(Debug, Clone)]
pub struct CompiledClassRange {
    range: Regex,
    class_token: Regex,
    grade_groups: usize,
    single_format: String,
}

impl CompiledClassRange {
    /// Build the capture regex for a range template.
    ///
    /// Every `g` becomes a grade group (repeated grades must be equal), the
    /// two `c` become the lowest and highest class token, anything else is
    /// matched literally.
    pub fn compile(config: &ClassRangeConfig) -> Result<Self> {
        let grade = Regex::new(&config.grade_regex)?;
        let class = Regex::new(&config.class_regex)?;

        let mut pattern = String::from("^");
        let mut grade_groups = 0;
        let mut class_groups = 0;
        for ch in config.range_format.chars() {
            match ch {
                'g' => {
                    pattern.push_str(&format!("(?P<g{grade_groups}>(?:{}))", grade.as_str()));
                    grade_groups += 1;
                }
                'c' => {
                    let name = match class_groups {
                        0 => "cmin",
                        1 => "cmax",
                        _ => {
                            return Err(AppError::config(format!(
                                "range_format '{}' uses 'c' more than twice",
                                config.range_format
                            )));
                        }
                    };
                    pattern.push_str(&format!("(?P<{name}>(?:{}))", class.as_str()));
                    class_groups += 1;
                }
                _ => pattern.push_str(&regex::escape(&ch.to_string())),
            }
        }
        pattern.push('$');

        if class_groups != 2 {
            return Err(AppError::config(format!(
                "range_format '{}' must use 'c' exactly twice",
                config.range_format
            )));
        }
        if grade_groups == 0 {
            return Err(AppError::config(format!(
                "range_format '{}' has no grade placeholder 'g'",
                config.range_format
            )));
        }
        if !config.single_format.contains('c') {
            return Err(AppError::config(format!(
                "single_format '{}' has no class placeholder 'c'",
                config.single_format
            )));
        }

        Ok(Self {
            range: Regex::new(&pattern)?,
            class_token: Regex::new(&format!("^(?:{})$", class.as_str()))?,
            grade_groups,
            single_format: config.single_format.clone(),
        })
    }

    /// Expand one raw designator, or `None` if it is not a range.
    pub fn expand(&self, raw: &str) -> Option<Vec<String>> {
        let caps = self.range.captures(raw.trim())?;

        let grade = caps.name("g0")?.as_str();
        for i in 1..self.grade_groups {
            if caps.name(&format!("g{i}"))?.as_str() != grade {
                return None;
            }
        }

        let tokens = enumerate_tokens(caps.name("cmin")?.as_str(), caps.name("cmax")?.as_str())?;
        let classes: Vec<String> = tokens
            .into_iter()
            .filter(|token| self.class_token.is_match(token))
            .map(|token| self.single(grade, &token))
            .collect();

        (!classes.is_empty()).then_some(classes)
    }

    fn single(&self, grade: &str, class: &str) -> String {
        let mut out = String::new();
        for ch in self.single_format.chars() {
            match ch {
                'g' => out.push_str(grade),
                'c' => out.push_str(class),
                _ => out.push(ch),
            }
        }
        out
    }
}

/// Longest range a template may expand to; wider ones are left as written.
const MAX_RANGE_TOKENS: u32 = 100;

/// All tokens from `min` to `max`: single characters or numbers.
fn enumerate_tokens(min: &str, max: &str) -> Option<Vec<String>> {
    let mut min_chars = min.chars();
    let mut max_chars = max.chars();
    if let (Some(a), None, Some(b), None) = (
        min_chars.next(),
        min_chars.next(),
        max_chars.next(),
        max_chars.next(),
    ) {
        if !within_cap(a as u32, b as u32) {
            return None;
        }
        return Some((a..=b).map(String::from).collect());
    }

    let (a, b): (u32, u32) = (min.parse().ok()?, max.parse().ok()?);
    if !within_cap(a, b) {
        return None;
    }
    let width = if min.starts_with('0') { min.len() } else { 0 };
    Some((a..=b).map(|n| format!("{n:0width$}")).collect())
}

fn within_cap(a: u32, b: u32) -> bool {
    a <= b && b - a < MAX_RANGE_TOKENS
}

/// Regexes for the config-free heuristics.
#[derive(Debug, Clone)]
struct ClassPatterns {
    bracket: Regex,
    grade_only: Regex,
    grade_range: Regex,
    grade_letters: Regex,
    grade_letters_part: Regex,
    leading_grade: Regex,
}

impl ClassPatterns {
    fn new() -> Self {
        let compile = |pattern: &str| {
            Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
        };
        Self {
            bracket: compile(r"(?P<g>\d{1,2})\s*\[(?P<list>[^\]]+)\]"),
            grade_only: compile(r"^\d{1,2}$"),
            grade_range: compile(r"^(?P<from>\d{1,2})\s*-\s*(?P<to>\d{1,2})$"),
            grade_letters: compile(r"^(?:\d{1,2}[a-zA-Z]+)+$"),
            grade_letters_part: compile(r"(?P<g>\d{1,2})(?P<letters>[a-zA-Z]+)"),
            leading_grade: compile(r"^0*(?P<g>\d+)"),
        }
    }
}

/// Expands raw class text into canonical class names.
#[derive(Debug, Clone)]
pub struct ClassSetResolver {
    roster: Vec<String>,
    exclusions: Vec<String>,
    range: Option<CompiledClassRange>,
    patterns: ClassPatterns,
}

impl Default for ClassSetResolver {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            exclusions: Vec::new(),
            range: None,
            patterns: ClassPatterns::new(),
        }
    }
}

impl ClassSetResolver {
    /// Create a resolver for a roster, exclusion list and optional range template.
    pub fn new(
        roster: &[String],
        exclusions: &[String],
        range: Option<&ClassRangeConfig>,
    ) -> Result<Self> {
        Ok(Self {
            roster: roster.iter().map(|c| c.trim().to_string()).collect(),
            exclusions: exclusions.iter().map(|c| c.trim().to_lowercase()).collect(),
            range: range.map(CompiledClassRange::compile).transpose()?,
            patterns: ClassPatterns::new(),
        })
    }

    /// Apply the range template to each raw string.
    ///
    /// Strings that do not match pass through unchanged.
    pub fn expand_class_ranges<I, S>(&self, raw: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .flat_map(|r| {
                let r = r.as_ref().trim();
                self.range
                    .as_ref()
                    .and_then(|range| range.expand(r))
                    .unwrap_or_else(|| vec![r.to_string()])
            })
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Resolve a raw class cell into class names.
    pub fn resolve(&self, text: &str) -> BTreeSet<String> {
        let text = self
            .patterns
            .bracket
            .replace_all(text, |caps: &regex::Captures<'_>| {
                caps["list"]
                    .split(',')
                    .map(|item| format!("{}{}", &caps["g"], item.trim()))
                    .collect::<Vec<_>>()
                    .join(",")
            });

        let mut classes = BTreeSet::new();
        for chunk in text.split([',', ';', '+']) {
            let chunk = normalize_whitespace(chunk);
            if is_placeholder(&chunk) {
                continue;
            }
            match self.expand_token(&chunk) {
                Some(expanded) => classes.extend(expanded),
                None if chunk.contains([' ', '/']) => {
                    for token in chunk.split([' ', '/']).filter(|t| !is_placeholder(t)) {
                        classes.extend(
                            self.expand_token(token)
                                .unwrap_or_else(|| vec![self.canonical(token)]),
                        );
                    }
                }
                None => {
                    classes.insert(self.canonical(&chunk));
                }
            }
        }

        classes.retain(|c| !self.exclusions.contains(&c.to_lowercase()));
        classes
    }

    /// Classes of the roster whose leading number is `grade`.
    pub fn classes_of_grade(&self, grade: u32) -> Vec<String> {
        self.classes_in_grades(grade, grade)
    }

    /// Classes of the roster with a leading number within `from..=to`.
    pub fn classes_in_grades(&self, from: u32, to: u32) -> Vec<String> {
        self.roster
            .iter()
            .filter(|class| {
                self.leading_grade(class)
                    .is_some_and(|grade| (from..=to).contains(&grade))
            })
            .cloned()
            .collect()
    }

    /// Expand one designator; `None` if no rule recognises it.
    fn expand_token(&self, token: &str) -> Option<Vec<String>> {
        let token = token.trim();

        if let Some(expanded) = self.range.as_ref().and_then(|r| r.expand(token)) {
            return Some(expanded.iter().map(|c| self.canonical(c)).collect());
        }

        if let Some(known) = self.roster_entry(token) {
            return Some(vec![known.to_string()]);
        }

        if self.patterns.grade_only.is_match(token) {
            let grade = token.parse().ok()?;
            return non_empty(self.classes_of_grade(grade));
        }

        if let Some(caps) = self.patterns.grade_range.captures(token) {
            let from = caps["from"].parse().ok()?;
            let to = caps["to"].parse().ok()?;
            return non_empty(self.classes_in_grades(from, to));
        }

        if self.patterns.grade_letters.is_match(token) {
            return self.expand_letters(token);
        }

        None
    }

    /// "8ab9abc" → 8a, 8b, 9a, 9b, 9c. With a roster, only roster classes count.
    fn expand_letters(&self, token: &str) -> Option<Vec<String>> {
        let candidates: Vec<String> = self
            .patterns
            .grade_letters_part
            .captures_iter(token)
            .flat_map(|caps| {
                let grade = caps["g"].to_string();
                caps["letters"]
                    .chars()
                    .map(move |letter| format!("{grade}{letter}"))
                    .collect::<Vec<_>>()
            })
            .collect();

        if self.roster.is_empty() {
            return Some(candidates);
        }

        non_empty(
            candidates
                .iter()
                .filter_map(|c| self.roster_entry(c).map(str::to_string))
                .collect(),
        )
    }

    fn roster_entry(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.roster
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name) || c.to_lowercase() == name.to_lowercase())
            .map(String::as_str)
    }

    /// Roster spelling of a name, or the name itself.
    fn canonical(&self, name: &str) -> String {
        let name = name.trim();
        match self.roster_entry(name) {
            Some(known) => known.to_string(),
            None => {
                if !self.roster.is_empty() {
                    log::debug!("Class '{}' is not in the roster", name);
                }
                name.to_string()
            }
        }
    }

    fn leading_grade(&self, class: &str) -> Option<u32> {
        self.patterns
            .leading_grade
            .captures(class)
            .and_then(|caps| caps["g"].parse().ok())
    }
}

fn non_empty(classes: Vec<String>) -> Option<Vec<String>> {
    (!classes.is_empty()).then_some(classes)
}
