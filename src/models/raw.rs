//! Intermediate records handed over by source adapters.
//!
//! An adapter turns one vendor page into a [`RawPage`]: days of rows, each row
//! an ordered list of `(column, text)` pairs. Cell texts may still carry inline
//! markup such as `<s>Ma</s> De`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Meaning of one table/XML column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    Lesson,
    Subject,
    PreviousSubject,
    Course,
    Type,
    /// Non-empty content marks the lesson as cancelled
    TypeEntfall,
    Room,
    PreviousRoom,
    Desc,
    /// Text is both description and type hint
    DescType,
    Teacher,
    PreviousTeacher,
    /// Where a moved lesson originally took place
    SubstitutionFrom,
    /// Where the teacher is moved to
    TeacherTo,
    Class,
    Date,
    Ignore,
}

impl ColumnType {
    pub const ALL: [ColumnType; 17] = [
        ColumnType::Lesson,
        ColumnType::Subject,
        ColumnType::PreviousSubject,
        ColumnType::Course,
        ColumnType::Type,
        ColumnType::TypeEntfall,
        ColumnType::Room,
        ColumnType::PreviousRoom,
        ColumnType::Desc,
        ColumnType::DescType,
        ColumnType::Teacher,
        ColumnType::PreviousTeacher,
        ColumnType::SubstitutionFrom,
        ColumnType::TeacherTo,
        ColumnType::Class,
        ColumnType::Date,
        ColumnType::Ignore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Lesson => "lesson",
            ColumnType::Subject => "subject",
            ColumnType::PreviousSubject => "previousSubject",
            ColumnType::Course => "course",
            ColumnType::Type => "type",
            ColumnType::TypeEntfall => "type-entfall",
            ColumnType::Room => "room",
            ColumnType::PreviousRoom => "previousRoom",
            ColumnType::Desc => "desc",
            ColumnType::DescType => "desc-type",
            ColumnType::Teacher => "teacher",
            ColumnType::PreviousTeacher => "previousTeacher",
            ColumnType::SubstitutionFrom => "substitutionFrom",
            ColumnType::TeacherTo => "teacherTo",
            ColumnType::Class => "class",
            ColumnType::Date => "date",
            ColumnType::Ignore => "ignore",
        }
    }
}

impl FromStr for ColumnType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::UnknownColumn(s.to_string()))
    }
}

impl TryFrom<String> for ColumnType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(column, text)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    pub column: ColumnType,
    pub text: String,
}

impl RawCell {
    pub fn new(column: ColumnType, text: impl Into<String>) -> Self {
        Self {
            column,
            text: text.into(),
        }
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    /// Build a row from `(column, text)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ColumnType, S)>,
        S: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(column, text)| RawCell::new(column, text))
                .collect(),
        }
    }

    /// Text of the first non-blank cell of a column.
    pub fn text_of(&self, column: ColumnType) -> Option<&str> {
        self.cells
            .iter()
            .filter(|c| c.column == column)
            .map(|c| c.text.trim())
            .find(|t| !t.is_empty())
    }
}

/// Rows published under one date header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDay {
    /// Header date text; rows may still carry their own `date` cells
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub last_change: Option<String>,

    #[serde(default)]
    pub messages: Vec<String>,

    #[serde(default)]
    pub rows: Vec<RawRow>,
}

/// An announcement not tied to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub title: Option<String>,

    pub text: String,

    /// Attach to this date's day; without one the message is schedule-wide
    #[serde(default)]
    pub date: Option<String>,
}

/// Everything one logical page delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    #[serde(default)]
    pub last_change: Option<String>,

    #[serde(default)]
    pub days: Vec<RawDay>,

    #[serde(default)]
    pub messages: Vec<RawMessage>,

    /// Classes the source lists, e.g. in a class selector
    #[serde(default)]
    pub classes: Vec<String>,

    #[serde(default)]
    pub teachers: Vec<String>,
}
