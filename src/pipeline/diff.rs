//! Change detection between two schedules.
//!
//! Callers that notify users compare the schedule they published last with
//! the one just assembled: which substitutions appeared or vanished per day,
//! which messages are new. [`fingerprint`] gives a cheap "did anything
//! change" check that ignores the source's last-change stamp.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{
    AdditionalInfo, ScheduleType, Substitution, SubstitutionSchedule, SubstitutionScheduleDay,
};

/// Changes within one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayDiff {
    pub date: Option<NaiveDate>,
    pub date_string: Option<String>,
    /// In the current schedule only
    pub added: Vec<Substitution>,
    /// In the previous schedule only
    pub removed: Vec<Substitution>,
    pub new_messages: Vec<String>,
}

impl DayDiff {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.new_messages.is_empty()
    }
}

/// Changes between two schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDiff {
    /// Days with at least one change
    pub days: Vec<DayDiff>,
    pub new_infos: Vec<AdditionalInfo>,
}

impl ScheduleDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.days.is_empty() || !self.new_infos.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.days
            .iter()
            .map(|d| d.added.len() + d.removed.len() + d.new_messages.len())
            .sum::<usize>()
            + self.new_infos.len()
    }
}

/// Calculator for computing diffs between schedules.
#[derive(Debug, Clone)]
pub struct DiffCalculator {
    /// Whether vanished substitutions are reported
    detect_removals: bool,
}

impl Default for DiffCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffCalculator {
    pub fn new() -> Self {
        Self {
            detect_removals: true,
        }
    }

    /// Only report what is new, e.g. for push notifications.
    pub fn additions_only() -> Self {
        Self {
            detect_removals: false,
        }
    }

    /// Calculate the diff between the previous and current schedule.
    pub fn calculate(
        &self,
        previous: &SubstitutionSchedule,
        current: &SubstitutionSchedule,
    ) -> ScheduleDiff {
        let mut days = Vec::new();

        for day in current.days() {
            let before = find_day(previous, day);
            let diff = self.diff_day(before, Some(day));
            if diff.has_changes() {
                days.push(diff);
            }
        }

        if self.detect_removals {
            for day in previous.days() {
                if find_day(current, day).is_none() {
                    let diff = self.diff_day(Some(day), None);
                    if diff.has_changes() {
                        days.push(diff);
                    }
                }
            }
        }

        let new_infos = current
            .additional_infos()
            .iter()
            .filter(|info| !previous.additional_infos().contains(*info))
            .cloned()
            .collect();

        ScheduleDiff { days, new_infos }
    }

    fn diff_day(
        &self,
        previous: Option<&SubstitutionScheduleDay>,
        current: Option<&SubstitutionScheduleDay>,
    ) -> DayDiff {
        let before: BTreeSet<&Substitution> =
            previous.map(|d| d.substitutions().collect()).unwrap_or_default();
        let after: BTreeSet<&Substitution> =
            current.map(|d| d.substitutions().collect()).unwrap_or_default();

        let added = after.difference(&before).map(|s| (*s).clone()).collect();
        let removed = if self.detect_removals {
            before.difference(&after).map(|s| (*s).clone()).collect()
        } else {
            Vec::new()
        };

        let new_messages = current
            .map(|d| {
                d.messages()
                    .iter()
                    .filter(|m| previous.is_none_or(|p| !p.messages().contains(*m)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let day = current.or(previous);
        DayDiff {
            date: day.and_then(|d| d.date),
            date_string: day.and_then(|d| d.date_string.clone()),
            added,
            removed,
            new_messages,
        }
    }
}

fn find_day<'a>(
    schedule: &'a SubstitutionSchedule,
    day: &SubstitutionScheduleDay,
) -> Option<&'a SubstitutionScheduleDay> {
    schedule
        .days()
        .iter()
        .find(|d| d.is_same_day(day.date, day.date_string.as_deref()))
}

/// Convenience function to calculate diff.
pub fn calculate_diff(previous: &SubstitutionSchedule, current: &SubstitutionSchedule) -> ScheduleDiff {
    DiffCalculator::new().calculate(previous, current)
}

#[derive(Serialize)]
struct FingerprintDay<'a> {
    date: Option<NaiveDate>,
    date_string: Option<&'a str>,
    substitutions: Vec<&'a Substitution>,
    messages: &'a BTreeSet<String>,
}

#[derive(Serialize)]
struct FingerprintView<'a> {
    schedule_type: ScheduleType,
    website: Option<&'a str>,
    days: Vec<FingerprintDay<'a>>,
    classes: &'a BTreeSet<String>,
    teachers: &'a BTreeSet<String>,
    additional_infos: &'a BTreeSet<AdditionalInfo>,
}

/// SHA-256 (hex) over the schedule content, ignoring last-change stamps.
pub fn fingerprint(schedule: &SubstitutionSchedule) -> Result<String> {
    let view = FingerprintView {
        schedule_type: schedule.schedule_type,
        website: schedule.website.as_deref(),
        days: schedule
            .days()
            .iter()
            .map(|d| FingerprintDay {
                date: d.date,
                date_string: d.date_string.as_deref(),
                substitutions: d.substitutions().collect(),
                messages: d.messages(),
            })
            .collect(),
        classes: schedule.classes(),
        teachers: schedule.teachers(),
        additional_infos: schedule.additional_infos(),
    };

    let bytes = serde_json::to_vec(&view)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
