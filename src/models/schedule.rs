//! The substitution schedule aggregate.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::day::{SubstitutionScheduleDay, min_present};
use crate::error::Result;

/// Whose schedule this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    /// Substitutions are listed per class
    #[default]
    Student,
    /// Substitutions are listed per teacher
    Teacher,
}

/// A schedule-wide announcement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    pub title: Option<String>,
    pub text: String,
    /// Whether a notification should be triggered
    pub has_information: bool,
    /// Whether the info came from the schedule itself
    pub from_schedule: bool,
}

impl AdditionalInfo {
    /// An announcement taken from the schedule source.
    pub fn from_schedule(title: Option<String>, text: impl Into<String>) -> Self {
        Self {
            title,
            text: text.into(),
            has_information: true,
            from_schedule: true,
        }
    }
}

/// Full set of substitution days for a school at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionSchedule {
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,

    /// Source website
    pub website: Option<String>,

    pub last_change: Option<NaiveDateTime>,

    pub last_change_string: Option<String>,

    days: Vec<SubstitutionScheduleDay>,

    classes: BTreeSet<String>,

    teachers: BTreeSet<String>,

    additional_infos: BTreeSet<AdditionalInfo>,
}

impl SubstitutionSchedule {
    /// Create an empty schedule for one fetch cycle.
    pub fn from_data(schedule_type: ScheduleType, website: Option<&str>) -> Result<Self> {
        let website = website
            .map(|w| url::Url::parse(w).map(|u| u.to_string()))
            .transpose()?;

        Ok(Self {
            schedule_type,
            website,
            ..Self::default()
        })
    }

    pub fn days(&self) -> &[SubstitutionScheduleDay] {
        &self.days
    }

    /// Look up the day for a parsed date.
    pub fn day(&self, date: NaiveDate) -> Option<&SubstitutionScheduleDay> {
        self.days.iter().find(|d| d.date == Some(date))
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn teachers(&self) -> &BTreeSet<String> {
        &self.teachers
    }

    pub fn additional_infos(&self) -> &BTreeSet<AdditionalInfo> {
        &self.additional_infos
    }

    /// Total number of substitutions over all days.
    pub fn substitution_count(&self) -> usize {
        self.days.iter().map(|d| d.substitution_count()).sum()
    }

    pub fn add_classes<I: IntoIterator<Item = String>>(&mut self, classes: I) {
        self.classes.extend(classes);
    }

    pub fn add_teachers<I: IntoIterator<Item = String>>(&mut self, teachers: I) {
        self.teachers.extend(teachers);
    }

    /// Add an announcement unless an identical one is present.
    pub fn add_additional_info(&mut self, info: AdditionalInfo) {
        self.additional_infos.insert(info);
    }

    /// Record the schedule-wide last change, keeping the newest one.
    pub fn update_last_change(&mut self, last_change: Option<NaiveDateTime>, text: Option<&str>) {
        let text = text.map(str::to_string);
        match (self.last_change, last_change) {
            (None, None) => {
                self.last_change_string = min_present(self.last_change_string.take(), text);
            }
            (Some(_), None) => {}
            (Some(current), Some(new)) if current > new => {}
            (Some(current), Some(new)) if current == new => {
                self.last_change_string = min_present(self.last_change_string.take(), text);
            }
            (_, Some(new)) => {
                self.last_change = Some(new);
                self.last_change_string = text;
            }
        }
    }

    /// Add a day, merging it into an existing day for the same date.
    pub fn add_day(&mut self, day: SubstitutionScheduleDay, merge_with_different_type: bool) {
        let existing = self
            .days
            .iter_mut()
            .find(|d| d.is_same_day(day.date, day.date_string.as_deref()));

        match existing {
            Some(existing) => existing.merge(day, merge_with_different_type),
            None => self.days.push(day),
        }

        let newest = self
            .days
            .iter()
            .filter(|d| d.last_change.is_some())
            .max_by_key(|d| d.last_change)
            .map(|d| (d.last_change, d.last_change_string.clone()));
        if let Some((last_change, text)) = newest {
            self.update_last_change(last_change, text.as_deref());
        }
        self.sort_days();
    }

    /// Fold another partial schedule into this one.
    ///
    /// Days are matched by date, so the result does not depend on the order
    /// in which partial schedules arrive.
    pub fn merge(&mut self, other: SubstitutionSchedule, merge_with_different_type: bool) {
        self.website = min_present(self.website.take(), other.website);
        self.update_last_change(other.last_change, other.last_change_string.as_deref());
        self.classes.extend(other.classes);
        self.teachers.extend(other.teachers);
        self.additional_infos.extend(other.additional_infos);
        for day in other.days {
            self.add_day(day, merge_with_different_type);
        }
    }

    /// Dated days first in calendar order, undated ones by their text.
    fn sort_days(&mut self) {
        self.days.sort_by(|a, b| {
            (a.date.is_none(), a.date, &a.date_string).cmp(&(
                b.date.is_none(),
                b.date,
                &b.date_string,
            ))
        });
    }
}
