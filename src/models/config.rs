//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ColumnType, ScheduleType};
use crate::services::{ColorProvider, CompiledClassRange};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Page loading settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Per-school normalization settings
    #[serde(default)]
    pub school: SchoolConfig,

    /// Generic adapter settings
    #[serde(default)]
    pub adapter: AdapterConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        self.school.validate()?;
        self.adapter.column_types()?;
        Ok(())
    }
}

/// Page loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum pages loaded at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Settings that differ from school to school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolConfig {
    /// Display name of the school
    #[serde(default)]
    pub name: Option<String>,

    /// Source website of the schedule
    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub schedule_type: ScheduleType,

    /// Class roster
    #[serde(default)]
    pub classes: Vec<String>,

    /// Known teacher abbreviations
    #[serde(default)]
    pub teachers: Vec<String>,

    /// Class names dropped after expansion
    #[serde(default)]
    pub exclude_classes: Vec<String>,

    /// Infer cancellations from struck-through values
    #[serde(default = "defaults::enabled")]
    pub auto_detect_type: bool,

    /// Split teacher cells like "MÜL, SCH" into several teachers
    #[serde(default = "defaults::enabled")]
    pub split_teachers: bool,

    /// Collapse entries that differ only in their type
    #[serde(default)]
    pub merge_with_different_type: bool,

    /// Type label to color name or `#RRGGBB`
    #[serde(default)]
    pub colors: BTreeMap<String, String>,

    #[serde(default)]
    pub class_range: Option<ClassRangeConfig>,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            name: None,
            website: None,
            schedule_type: ScheduleType::default(),
            classes: Vec::new(),
            teachers: Vec::new(),
            exclude_classes: Vec::new(),
            auto_detect_type: true,
            split_teachers: true,
            merge_with_different_type: false,
            colors: BTreeMap::new(),
            class_range: None,
        }
    }
}

impl SchoolConfig {
    /// Check color overrides, the range template and the website.
    pub fn validate(&self) -> Result<()> {
        for (kind, value) in &self.colors {
            if ColorProvider::resolve_color_value(value).is_none() {
                return Err(AppError::validation(format!(
                    "colors.{kind}: '{value}' is neither a color name nor #RRGGBB"
                )));
            }
        }
        if let Some(range) = &self.class_range {
            CompiledClassRange::compile(range)?;
        }
        if let Some(website) = &self.website {
            url::Url::parse(website)?;
        }
        Ok(())
    }
}

/// Template describing compact class ranges such as "7A-C".
///
/// In `range_format`, `g` stands for the grade and `c` for a class token;
/// `c` appears exactly twice (lowest and highest class). `single_format`
/// describes how one expanded class is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRangeConfig {
    pub range_format: String,

    #[serde(default = "defaults::single_format")]
    pub single_format: String,

    #[serde(default = "defaults::grade_regex")]
    pub grade_regex: String,

    #[serde(default = "defaults::class_regex")]
    pub class_regex: String,
}

/// Which generic adapter parses the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    #[default]
    Html,
    Json,
}

/// Selector-driven table layout for the generic adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub kind: AdapterKind,

    /// Column meaning, in table order
    #[serde(default = "defaults::columns")]
    pub columns: Vec<String>,

    /// Container holding one day (header plus table); whole page if unset
    #[serde(default)]
    pub day_selector: Option<String>,

    /// Element holding the date header within a day
    #[serde(default)]
    pub date_selector: Option<String>,

    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    #[serde(default = "defaults::cell_selector")]
    pub cell_selector: String,

    #[serde(default)]
    pub last_change_selector: Option<String>,

    /// Day-level free-text messages
    #[serde(default)]
    pub message_selector: Option<String>,

    /// Schedule-wide announcements
    #[serde(default)]
    pub info_selector: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            kind: AdapterKind::default(),
            columns: defaults::columns(),
            day_selector: None,
            date_selector: None,
            row_selector: defaults::row_selector(),
            cell_selector: defaults::cell_selector(),
            last_change_selector: None,
            message_selector: None,
            info_selector: None,
        }
    }
}

impl AdapterConfig {
    /// Parse the configured column names.
    pub fn column_types(&self) -> Result<Vec<ColumnType>> {
        self.columns.iter().map(|c| c.parse()).collect()
    }
}

mod defaults {
    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; vplan/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // School defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn single_format() -> String {
        "gc".into()
    }
    pub fn grade_regex() -> String {
        r"\d+".into()
    }
    pub fn class_regex() -> String {
        "[A-Za-z]".into()
    }

    // Adapter defaults
    pub fn columns() -> Vec<String> {
        ["class", "lesson", "subject", "teacher", "room", "type", "desc"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn row_selector() -> String {
        "tr".into()
    }
    pub fn cell_selector() -> String {
        "td".into()
    }
}
