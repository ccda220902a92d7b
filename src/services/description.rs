//! Narrative "Vertretungstext" parsing.
//!
//! Info cells often carry the real meaning of a row: "für Deutsch Müller",
//! "Mathe Schmidt fällt aus", "Bio Meier verlegt nach Do 3. Std.". Rules are
//! tried in order and the first match wins; the order matters because loose
//! inputs match several rules.

use regex::{Captures, Regex};

use crate::models::{SubstitutionBuilder, labels};
use crate::utils::{is_placeholder, normalize_whitespace};

/// Short texts that are a type on their own.
const TYPE_LITERALS: &[&str] = &["fällt aus", "Klausur", "Aufg."];

#[derive(Debug, Clone)]
struct DescriptionPatterns {
    instead_of: Regex,
    cancelled: Regex,
    moved_to: Regex,
    independent: Regex,
    takes_over: Regex,
}

impl DescriptionPatterns {
    fn german() -> Self {
        let compile = |pattern: &str| {
            Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
        };
        Self {
            instead_of: compile(
                r"(?i)^für\s+(?P<subject>\S+)\s+(?P<teacher>[^,]+?)\s*(?:,\s*(?P<rest>.*))?$",
            ),
            cancelled: compile(r"(?i)^(?P<subject>\S+)\s+(?P<teacher>\S+)\s+fällt\s+aus!?$"),
            moved_to: compile(
                r"(?i)^(?P<subject>\S+)\s+(?P<teacher>\S+)\s+verlegt\s+nach\s*(?P<rest>.*)$",
            ),
            independent: compile(r"(?i)^selbst\.\s*(?P<rest>.*)$"),
            takes_over: compile(r"(?:^|[\s,;(])(?P<teacher>\p{Lu}[\p{L}.\-]*)\s+übernimmt\s+ab\b"),
        }
    }
}

/// Extracts previous subject/teacher, type and description from info text.
#[derive(Debug, Clone)]
pub struct DescriptionParser {
    patterns: DescriptionPatterns,
}

impl Default for DescriptionParser {
    fn default() -> Self {
        Self {
            patterns: DescriptionPatterns::german(),
        }
    }
}

impl DescriptionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the first matching rule to `builder`, then look for a teacher
    /// taking over in the resulting description.
    ///
    /// A type already set on `builder` (from a type column) is kept.
    pub fn parse_description(
        &self,
        builder: &mut SubstitutionBuilder,
        text: &str,
        is_teacher_schedule: bool,
    ) {
        let text = normalize_whitespace(text);
        if is_placeholder(&text) {
            return;
        }

        let p = &self.patterns;
        if let Some(caps) = p.instead_of.captures(&text) {
            self.set_previous(builder, &caps, is_teacher_schedule);
            if let Some(rest) = caps.name("rest") {
                builder.desc(rest.as_str());
            }
        } else if let Some(caps) = p.cancelled.captures(&text) {
            self.set_previous(builder, &caps, is_teacher_schedule);
            kind_unless_set(builder, labels::CANCELLATION);
        } else if let Some(caps) = p.moved_to.captures(&text) {
            self.set_previous(builder, &caps, is_teacher_schedule);
            kind_unless_set(builder, labels::RELOCATION);
            builder.desc(&caps["rest"]);
        } else if let Some(caps) = p.independent.captures(&text) {
            kind_unless_set(builder, labels::INDEPENDENT_WORK);
            builder.desc(&caps["rest"]);
        } else if let Some(literal) = TYPE_LITERALS
            .iter()
            .find(|literal| literal.to_lowercase() == text.to_lowercase())
        {
            kind_unless_set(builder, literal);
        } else {
            builder.desc(text.as_str());
        }

        self.find_covering_teacher(builder);
    }

    fn set_previous(
        &self,
        builder: &mut SubstitutionBuilder,
        caps: &Captures<'_>,
        is_teacher_schedule: bool,
    ) {
        builder.previous_subject(&caps["subject"]);
        let teacher = caps["teacher"].trim();
        // teacher schedules name the class where student schedules name the teacher
        if is_teacher_schedule && teacher.starts_with(|c: char| c.is_ascii_digit()) {
            builder.classes([teacher]);
        } else {
            builder.previous_teacher(teacher);
        }
    }

    fn find_covering_teacher(&self, builder: &mut SubstitutionBuilder) {
        if builder.has_teachers() {
            return;
        }
        let Some(desc) = builder.current_desc() else {
            return;
        };
        if let Some(caps) = self.patterns.takes_over.captures(&desc) {
            log::debug!("Covering teacher '{}' found in '{}'", &caps["teacher"], desc);
            builder.teacher(&caps["teacher"]);
        }
    }
}

fn kind_unless_set(builder: &mut SubstitutionBuilder, kind: &str) {
    if builder.current_kind().is_none() {
        builder.kind(kind);
    }
}
