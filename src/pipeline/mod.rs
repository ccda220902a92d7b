//! Pipeline from raw pages to a finished schedule.
//!
//! - `ScheduleAssembler`: fold raw pages into a `SubstitutionSchedule`
//! - `calculate_diff` / `fingerprint`: change detection for callers

pub mod assemble;
pub mod diff;

pub use assemble::ScheduleAssembler;
pub use diff::{DayDiff, DiffCalculator, ScheduleDiff, calculate_diff, fingerprint};
