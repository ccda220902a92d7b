//! Substitution data structure and its builder.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::services::ColorProvider;

/// Canonical type labels produced by classification.
pub mod labels {
    /// Lesson is cancelled.
    pub const CANCELLATION: &str = "Entfall";
    /// Lesson is covered by another teacher (the default).
    pub const SUBSTITUTION: &str = "Vertretung";
    /// Lesson is moved to another slot.
    pub const RELOCATION: &str = "Verlegung";
    /// Lesson takes place in another room.
    pub const ROOM_CHANGE: &str = "Raumänderung";
    /// Students work on their own.
    pub const INDEPENDENT_WORK: &str = "selbst.";
    /// Written exam.
    pub const EXAM: &str = "Klausur";
}

/// One affected lesson slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    /// Period identifier, e.g. "5" or "3-4"
    pub lesson: String,

    /// Canonical class names
    #[serde(default)]
    pub classes: BTreeSet<String>,

    /// Covering teachers
    #[serde(default)]
    pub teachers: BTreeSet<String>,

    /// Originally scheduled teachers
    #[serde(default)]
    pub previous_teachers: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_room: Option<String>,

    /// Canonical type label
    #[serde(rename = "type")]
    pub kind: String,

    /// Display color derived from `kind`
    pub color: String,

    /// Free-text remainder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Substitution {
    /// Start building a substitution.
    pub fn builder() -> SubstitutionBuilder {
        SubstitutionBuilder::default()
    }

    /// Whether the lesson is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.kind == labels::CANCELLATION
    }
}

/// Accumulates the fields of one raw row before the substitution is finalised.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionBuilder {
    lesson: Option<String>,
    classes: BTreeSet<String>,
    teachers: BTreeSet<String>,
    previous_teachers: BTreeSet<String>,
    subject: Option<String>,
    previous_subject: Option<String>,
    room: Option<String>,
    previous_room: Option<String>,
    kind: Option<String>,
    desc: Vec<String>,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl SubstitutionBuilder {
    pub fn lesson(&mut self, lesson: impl Into<String>) -> &mut Self {
        self.lesson = non_empty(lesson);
        self
    }

    pub fn classes<I, S>(&mut self, classes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.extend(classes.into_iter().filter_map(non_empty));
        self
    }

    pub fn teacher(&mut self, teacher: impl Into<String>) -> &mut Self {
        self.teachers.extend(non_empty(teacher));
        self
    }

    pub fn previous_teacher(&mut self, teacher: impl Into<String>) -> &mut Self {
        self.previous_teachers.extend(non_empty(teacher));
        self
    }

    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = non_empty(subject);
        self
    }

    pub fn previous_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.previous_subject = non_empty(subject);
        self
    }

    pub fn room(&mut self, room: impl Into<String>) -> &mut Self {
        self.room = non_empty(room);
        self
    }

    pub fn previous_room(&mut self, room: impl Into<String>) -> &mut Self {
        self.previous_room = non_empty(room);
        self
    }

    pub fn kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kind = non_empty(kind);
        self
    }

    /// Append a segment to the description. Segments are joined with ", ".
    pub fn desc(&mut self, desc: impl Into<String>) -> &mut Self {
        if let Some(desc) = non_empty(desc) {
            if !self.desc.contains(&desc) {
                self.desc.push(desc);
            }
        }
        self
    }

    /// Drop everything collected for the description so far.
    pub fn clear_desc(&mut self) -> &mut Self {
        self.desc.clear();
        self
    }

    pub fn current_kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn current_desc(&self) -> Option<String> {
        (!self.desc.is_empty()).then(|| self.desc.join(", "))
    }

    pub fn has_classes(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn has_teachers(&self) -> bool {
        !self.teachers.is_empty()
    }

    pub fn has_subject(&self) -> bool {
        self.subject.is_some()
    }

    pub fn has_previous_subject(&self) -> bool {
        self.previous_subject.is_some()
    }

    pub fn has_previous_teachers(&self) -> bool {
        !self.previous_teachers.is_empty()
    }

    /// Something was struck through and nothing replaces it.
    pub fn is_struck_without_replacement(&self) -> bool {
        let had_value = self.previous_subject.is_some() || !self.previous_teachers.is_empty();
        had_value && self.subject.is_none() && self.teachers.is_empty()
    }

    /// Finalise the substitution. Without a type, "Vertretung" applies.
    pub fn build(self, colors: &ColorProvider) -> Substitution {
        let kind = self
            .kind
            .unwrap_or_else(|| labels::SUBSTITUTION.to_string());
        let color = colors.color_for(&kind);
        let desc = (!self.desc.is_empty()).then(|| self.desc.join(", "));

        Substitution {
            lesson: self.lesson.unwrap_or_default(),
            classes: self.classes,
            teachers: self.teachers,
            previous_teachers: self.previous_teachers,
            subject: self.subject,
            previous_subject: self.previous_subject,
            room: self.room,
            previous_room: self.previous_room,
            kind,
            color,
            desc,
        }
    }
}
