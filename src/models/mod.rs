// src/models/mod.rs

//! Domain models for schedule normalization.
//!
//! This module contains the canonical schedule object graph, the raw records
//! adapters hand over, and the configuration structures.

mod config;
mod day;
mod raw;
mod schedule;
mod substitution;

// Re-export all public types
pub use config::{AdapterConfig, AdapterKind, ClassRangeConfig, Config, FetchConfig, SchoolConfig};
pub use day::SubstitutionScheduleDay;
pub use raw::{ColumnType, RawCell, RawDay, RawMessage, RawPage, RawRow};
pub use schedule::{AdditionalInfo, ScheduleType, SubstitutionSchedule};
pub use substitution::{Substitution, SubstitutionBuilder, labels};
