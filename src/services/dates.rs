// src/services/dates.rs

//! German date and date-time parsing.
//!
//! Texts are cleaned first (status prefixes such as "Stand:", week-type
//! suffixes such as ", Woche A", weekday names), then tried against an ordered
//! list of patterns; the first match wins. Dates published without a year are
//! placed in whichever of last, this or next year lies closest to the
//! reference time, so a plan printed on 30 December for "3. Januar" lands in
//! January of the following year.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::{Captures, Regex};

use crate::utils::normalize_whitespace;

const MONTHS: [(&str, &[&str]); 12] = [
    ("Januar", &["januar", "jänner", "jan"]),
    ("Februar", &["februar", "feb"]),
    ("März", &["märz", "maerz", "mär", "mrz"]),
    ("April", &["april", "apr"]),
    ("Mai", &["mai"]),
    ("Juni", &["juni", "jun"]),
    ("Juli", &["juli", "jul"]),
    ("August", &["august", "aug"]),
    ("September", &["september", "sept", "sep"]),
    ("Oktober", &["oktober", "okt"]),
    ("November", &["november", "nov"]),
    ("Dezember", &["dezember", "dez"]),
];

const WEEKDAYS: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

/// Markers after which the actual timestamp starts.
const STATUS_MARKERS: &[&str] = &["Stand:", "Import:", "Aktualisiert:", "Letzte Änderung:"];

/// Leading words that carry no date information.
const PREFIXES: &[&str] = &[
    "Vertretungsplan für",
    "Vertretungen für",
    "Vertretungen am",
    "Stand",
    "gültig ab",
    "für",
    "am",
    "den",
];

/// German month name for a 1-based month number.
pub fn german_month_name(month: u32) -> Option<&'static str> {
    MONTHS.get(month.checked_sub(1)? as usize).map(|(name, _)| *name)
}

/// German weekday name.
pub fn german_weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAYS[weekday.num_days_from_monday() as usize]
}

/// Long German form, e.g. "Freitag, 3. Januar 2025".
pub fn format_german_date(date: NaiveDate) -> String {
    format!(
        "{}, {}. {} {}",
        german_weekday_name(date.weekday()),
        date.day(),
        german_month_name(date.month()).unwrap_or_default(),
        date.year()
    )
}

fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .position(|(_, aliases)| aliases.contains(&name.as_str()))
        .map(|i| i as u32 + 1)
}

/// Regular expressions used by [`DateTimeNormalizer`], built once.
#[derive(Debug, Clone)]
pub struct DatePatterns {
    week_suffix: Regex,
    weekday: Regex,
    uhr: Regex,
    /// Date patterns in priority order; groups `d`, `m`/`mn`, optional `y`
    dates: Vec<Regex>,
    iso_date_time: Regex,
    date_then_time: Regex,
    time_then_date: Regex,
}

impl DatePatterns {
    /// Patterns for German-language schedules.
    pub fn german() -> Self {
        let compile = |pattern: &str| {
            Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
        };
        let time = r"\d{1,2}:\d{2}(?::\d{2})?";

        Self {
            week_suffix: compile(
                r"(?i)[,;]?\s*\(?\s*(?:\bWoche:?\s*[A-Z0-9]{1,2}|\b[A-Z]-?Woche|\b\p{L}+woche|\b\d{1,2}\.\s*Woche)\s*\)?\s*$",
            ),
            weekday: compile(
                r"(?i)\b(?:montag|dienstag|mittwoch|donnerstag|freitag|samstag|sonnabend|sonntag|mo|di|mi|do|fr|sa|so)\b\.?,?",
            ),
            uhr: compile(r"(?i)\s*\buhr\b\.?"),
            dates: vec![
                // 3.1.2025 / 03.01.25 / 3.1.
                compile(r"^(?P<d>\d{1,2})\.\s*(?P<m>\d{1,2})(?:\.\s*(?P<y>\d{4}|\d{2})?)?$"),
                // 2025-01-03
                compile(r"^(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})$"),
                // 20250103
                compile(r"^(?P<y>\d{4})(?P<m>\d{2})(?P<d>\d{2})$"),
                // 3. Januar 2025 / 3 Jan / 3. Jan.
                compile(r"^(?P<d>\d{1,2})\.?\s*(?P<mn>\p{L}+)\.?\s*(?P<y>\d{4})?$"),
                // Januar 3, 2025
                compile(r"^(?P<mn>\p{L}+)\.?\s+(?P<d>\d{1,2})\.?,?\s*(?P<y>\d{4})?$"),
            ],
            iso_date_time: compile(&format!(
                r"^(?P<date>\d{{4}}-\d{{1,2}}-\d{{1,2}})[T ](?P<time>{time})$"
            )),
            date_then_time: compile(&format!(
                r"(?i)^(?P<date>.+?)[\s,;-]+(?:um\s+)?(?P<time>{time})$"
            )),
            time_then_date: compile(&format!(r"(?i)^(?P<time>{time})[\s,;-]+(?P<date>.+)$")),
        }
    }
}

impl Default for DatePatterns {
    fn default() -> Self {
        Self::german()
    }
}

/// Parses German date texts into calendar values.
#[derive(Debug, Clone, Default)]
pub struct DateTimeNormalizer {
    patterns: DatePatterns,
    /// Fixed "now" for year disambiguation; the local clock when unset
    reference: Option<NaiveDateTime>,
}

impl DateTimeNormalizer {
    pub fn new(patterns: DatePatterns) -> Self {
        Self {
            patterns,
            reference: None,
        }
    }

    /// Use a fixed reference time instead of the clock.
    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = Some(reference);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.reference.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Parse a date. `None` means "unknown date", never an error.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let cleaned = self.clean(text);
        if cleaned.is_empty() {
            return None;
        }

        let parsed = self
            .patterns
            .dates
            .iter()
            .find_map(|pattern| pattern.captures(&cleaned).and_then(|c| self.date_from(&c)))
            .or_else(|| self.parse_date_time(text).map(|dt| dt.date()));

        if parsed.is_none() {
            log::debug!("Unrecognized date text '{}'", text.trim());
        }
        parsed
    }

    /// Parse a date with time of day. `None` means "unknown".
    pub fn parse_date_time(&self, text: &str) -> Option<NaiveDateTime> {
        let cleaned = self.clean(text);
        let cleaned = normalize_whitespace(&self.patterns.uhr.replace_all(&cleaned, ""));

        let caps = [
            &self.patterns.iso_date_time,
            &self.patterns.date_then_time,
            &self.patterns.time_then_date,
        ]
        .into_iter()
        .find_map(|pattern| pattern.captures(&cleaned))?;

        let time = parse_time(&caps["time"])?;
        let date_text = caps["date"].trim_end_matches([',', ';', '-', ' ']);
        let date = self
            .patterns
            .dates
            .iter()
            .find_map(|pattern| pattern.captures(date_text).and_then(|c| self.date_from(&c)))?;
        Some(date.and_time(time))
    }

    /// Strip status markers, week-type suffixes, weekday names and filler words.
    fn clean(&self, text: &str) -> String {
        let mut text = normalize_whitespace(text);

        for marker in STATUS_MARKERS {
            if let Some(idx) = text.find(marker) {
                text = text[idx + marker.len()..].trim().to_string();
            }
        }

        text = self.patterns.week_suffix.replace(&text, "").into_owned();
        text = self.patterns.weekday.replace_all(&text, " ").into_owned();
        text = normalize_whitespace(&text);

        loop {
            let Some(rest) = PREFIXES.iter().find_map(|prefix| strip_prefix_ci(&text, prefix))
            else {
                break;
            };
            let rest = rest.trim_start_matches([' ', ':', ',']).to_string();
            text = rest;
        }

        text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
            .to_string()
    }

    fn date_from(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let day: u32 = caps.name("d")?.as_str().parse().ok()?;
        let month = match caps.name("m") {
            Some(m) => m.as_str().parse().ok()?,
            None => month_from_name(caps.name("mn")?.as_str())?,
        };

        match caps.name("y") {
            Some(y) => {
                let mut year: i32 = y.as_str().parse().ok()?;
                if y.as_str().len() == 2 {
                    year += 2000;
                }
                NaiveDate::from_ymd_opt(year, month, day)
            }
            None => self.nearest_year(month, day),
        }
    }

    /// Place a yearless day/month in the year closest to the reference time.
    fn nearest_year(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let today = self.now().date();
        let year = today.year();
        [year - 1, year, year + 1]
            .into_iter()
            .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
            .min_by_key(|candidate| (*candidate - today).num_days().abs())
    }
}

/// Case-insensitive prefix strip that only cuts at a word boundary.
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    let rest = &text[prefix.len()..];
    let at_boundary = rest.is_empty() || rest.starts_with([' ', ':', ',']);
    (head.to_lowercase() == prefix.to_lowercase() && at_boundary).then_some(rest)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}
