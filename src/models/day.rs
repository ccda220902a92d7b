//! One calendar date's worth of substitutions and messages.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::substitution::{Substitution, labels};

/// Substitutions and messages for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionScheduleDay {
    /// Parsed date, if the source text could be interpreted
    pub date: Option<NaiveDate>,

    /// Date text as published by the source
    pub date_string: Option<String>,

    /// Last change reported for this specific day
    pub last_change: Option<NaiveDateTime>,

    pub last_change_string: Option<String>,

    substitutions: BTreeSet<Substitution>,

    messages: BTreeSet<String>,
}

impl SubstitutionScheduleDay {
    /// Create an empty day.
    pub fn new(date: Option<NaiveDate>, date_string: Option<String>) -> Self {
        Self {
            date,
            date_string,
            ..Self::default()
        }
    }

    /// Whether this day is the one identified by `date` / `date_string`.
    ///
    /// Parsed dates win when both sides have one; otherwise the published
    /// texts are compared.
    pub fn is_same_day(&self, date: Option<NaiveDate>, date_string: Option<&str>) -> bool {
        match (self.date, date) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.date_string.as_deref(), date_string) {
                (Some(a), Some(b)) => a.trim() == b.trim(),
                _ => false,
            },
        }
    }

    pub fn substitutions(&self) -> impl Iterator<Item = &Substitution> {
        self.substitutions.iter()
    }

    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }

    pub fn messages(&self) -> &BTreeSet<String> {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty() && self.messages.is_empty()
    }

    /// Add a substitution, folding it into an existing entry where possible.
    ///
    /// An entry that differs only in its classes gains the new classes. With
    /// `merge_with_different_type`, an entry that differs only in its type is
    /// collapsed into one.
    pub fn add_substitution(&mut self, substitution: Substitution, merge_with_different_type: bool) {
        self.add_substitutions([substitution], merge_with_different_type);
    }

    /// Add several substitutions at once; see [`Self::add_substitution`].
    pub fn add_substitutions<I>(&mut self, substitutions: I, merge_with_different_type: bool)
    where
        I: IntoIterator<Item = Substitution>,
    {
        let existing = std::mem::take(&mut self.substitutions);
        self.substitutions = fold_substitutions(
            existing.into_iter().chain(substitutions),
            merge_with_different_type,
        );
    }

    /// Add a free-text message, ignoring duplicates.
    pub fn add_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        let message = message.trim();
        if !message.is_empty() {
            self.messages.insert(message.to_string());
        }
    }

    /// Record a last-change timestamp, keeping the newest one.
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

    /// Fold another page's view of the same date into this day.
    pub fn merge(&mut self, other: SubstitutionScheduleDay, merge_with_different_type: bool) {
        self.date = min_present(self.date, other.date);
        self.date_string = min_present(self.date_string.take(), other.date_string);
        self.update_last_change(other.last_change, other.last_change_string.as_deref());
        self.add_substitutions(other.substitutions, merge_with_different_type);
        self.messages.extend(other.messages);
    }
}

/// The smaller of two optional values, preferring one that is present.
pub(crate) fn min_present<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Reduce substitutions to their canonical form.
///
/// Every entry is split into one entry per class. With
/// `merge_with_different_type`, entries for the same class that differ only
/// in type keep the preferred type. Entries equal except for their class are
/// then joined again. The result depends only on the set of entries seen,
/// not on the order they arrived in.
fn fold_substitutions<I>(substitutions: I, merge_with_different_type: bool) -> BTreeSet<Substitution>
where
    I: IntoIterator<Item = Substitution>,
{
    let singles = substitutions.into_iter().flat_map(split_classes);

    let resolved: Vec<Substitution> = if merge_with_different_type {
        let mut by_slot: BTreeMap<Substitution, Substitution> = BTreeMap::new();
        for single in singles {
            let mut slot = single.clone();
            slot.kind.clear();
            slot.color.clear();
            match by_slot.remove(&slot) {
                Some(current) => by_slot.insert(slot, preferred_type(current, single)),
                None => by_slot.insert(slot, single),
            };
        }
        by_slot.into_values().collect()
    } else {
        singles.collect()
    };

    // Classless entries are never joined with classed ones.
    let mut grouped: BTreeMap<(bool, Substitution), BTreeSet<String>> = BTreeMap::new();
    for mut single in resolved {
        let classes = std::mem::take(&mut single.classes);
        grouped
            .entry((classes.is_empty(), single))
            .or_default()
            .extend(classes);
    }

    grouped
        .into_iter()
        .map(|((_, mut substitution), classes)| {
            substitution.classes = classes;
            substitution
        })
        .collect()
}

/// One copy of `substitution` per class; classless entries stay as they are.
fn split_classes(substitution: Substitution) -> Vec<Substitution> {
    if substitution.classes.len() <= 1 {
        return vec![substitution];
    }
    let mut template = substitution;
    let classes = std::mem::take(&mut template.classes);
    classes
        .into_iter()
        .map(|class| {
            let mut single = template.clone();
            single.classes.insert(class);
            single
        })
        .collect()
}

/// Choose between two substitutions that differ only in type.
///
/// "Vertretung" wins, otherwise the smaller label.
fn preferred_type(a: Substitution, b: Substitution) -> Substitution {
    let rank = |s: &Substitution| (s.kind != labels::SUBSTITUTION, s.kind.clone());
    if rank(&a) <= rank(&b) { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ColorProvider;

    fn sub(lesson: &str, class: &str, kind: &str) -> Substitution {
        let mut builder = Substitution::builder();
        builder.lesson(lesson).classes([class]).subject("Ma").kind(kind);
        builder.build(&ColorProvider::default())
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_is_same_day_prefers_parsed_date() {
        let day = SubstitutionScheduleDay::new(date(2025, 1, 3), Some("Freitag, 3.1.".into()));
        assert!(day.is_same_day(date(2025, 1, 3), Some("03.01.2025")));
        assert!(!day.is_same_day(date(2025, 1, 4), Some("Freitag, 3.1.")));
        assert!(day.is_same_day(None, Some("Freitag, 3.1.")));
    }

    #[test]
    fn test_duplicate_substitution_ignored() {
        let mut day = SubstitutionScheduleDay::default();
        day.add_substitution(sub("1", "5a", "Entfall"), false);
        day.add_substitution(sub("1", "5a", "Entfall"), false);
        assert_eq!(day.substitution_count(), 1);
    }

    #[test]
    fn test_classes_merged() {
        let mut day = SubstitutionScheduleDay::default();
        day.add_substitution(sub("1", "5a", "Entfall"), false);
        day.add_substitution(sub("1", "5b", "Entfall"), false);

        assert_eq!(day.substitution_count(), 1);
        let merged = day.substitutions().next().unwrap();
        assert_eq!(merged.classes.len(), 2);
    }

    #[test]
    fn test_type_merge_is_opt_in() {
        let mut day = SubstitutionScheduleDay::default();
        day.add_substitution(sub("1", "5a", "Entfall"), false);
        day.add_substitution(sub("1", "5a", "Vertretung"), false);
        assert_eq!(day.substitution_count(), 2);

        let mut day = SubstitutionScheduleDay::default();
        day.add_substitution(sub("1", "5a", "Entfall"), true);
        day.add_substitution(sub("1", "5a", "Vertretung"), true);
        assert_eq!(day.substitution_count(), 1);
        assert_eq!(day.substitutions().next().unwrap().kind, "Vertretung");
    }

    #[test]
    fn test_type_merge_order_independent() {
        let mut first = SubstitutionScheduleDay::default();
        first.add_substitution(sub("2", "6c", "Verlegung"), true);
        first.add_substitution(sub("2", "6c", "Entfall"), true);

        let mut second = SubstitutionScheduleDay::default();
        second.add_substitution(sub("2", "6c", "Entfall"), true);
        second.add_substitution(sub("2", "6c", "Verlegung"), true);

        assert_eq!(first, second);
    }

    #[test]
    fn test_messages_deduplicated() {
        let mut day = SubstitutionScheduleDay::default();
        day.add_message("Wandertag 7a");
        day.add_message(" Wandertag 7a ");
        day.add_message("");
        assert_eq!(day.messages().iter().collect::<Vec<_>>(), ["Wandertag 7a"]);
    }

    #[test]
    fn test_type_and_class_merge_all_orders() {
        let a = sub("1", "5a", "Entfall");
        let b = sub("1", "5a", "Vertretung");
        let c = sub("1", "5b", "Entfall");
        let orders = [
            [&a, &b, &c],
            [&a, &c, &b],
            [&b, &a, &c],
            [&b, &c, &a],
            [&c, &a, &b],
            [&c, &b, &a],
        ];

        let days: Vec<SubstitutionScheduleDay> = orders
            .iter()
            .map(|order| {
                let mut day = SubstitutionScheduleDay::default();
                for s in order {
                    day.add_substitution((*s).clone(), true);
                }
                day
            })
            .collect();

        for day in &days[1..] {
            assert_eq!(day, &days[0]);
        }
        let entries: Vec<_> = days[0]
            .substitutions()
            .map(|s| (s.classes.iter().cloned().collect::<Vec<_>>(), s.kind.as_str()))
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&(vec!["5a".to_string()], "Vertretung")));
        assert!(entries.contains(&(vec!["5b".to_string()], "Entfall")));
    }

    #[test]
    fn test_merge_same_date_in_either_order() {
        let mut first = SubstitutionScheduleDay::new(date(2025, 3, 3), Some("Montag, 3.3.".into()));
        first.add_message("Aula gesperrt");
        first.add_substitution(sub("1", "5a", "Entfall"), false);

        let mut second = SubstitutionScheduleDay::new(date(2025, 3, 3), Some("03.03.2025".into()));
        second.add_message("Wandertag 7a");
        second.add_substitution(sub("1", "5b", "Entfall"), false);

        let mut forward = first.clone();
        forward.merge(second.clone(), false);
        let mut backward = second;
        backward.merge(first, false);

        assert_eq!(forward, backward);
        assert_eq!(forward.substitution_count(), 1);
        assert_eq!(forward.messages().len(), 2);
    }

    #[test]
    fn test_last_change_keeps_newest() {
        let early = date(2025, 1, 2).and_then(|d| d.and_hms_opt(7, 0, 0));
        let late = date(2025, 1, 2).and_then(|d| d.and_hms_opt(9, 30, 0));

        let mut day = SubstitutionScheduleDay::default();
        day.update_last_change(late, Some("09:30"));
        day.update_last_change(early, Some("07:00"));
        assert_eq!(day.last_change, late);
        assert_eq!(day.last_change_string.as_deref(), Some("09:30"));
    }
}
