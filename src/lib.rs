// src/lib.rs

//! vplan: substitution schedule normalization
//!
//! Turns raw records extracted from school substitution schedules into one
//! canonical [`SubstitutionSchedule`](models::SubstitutionSchedule).

pub mod adapters;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
#[cfg(feature = "fetch")]
pub mod sources;
pub mod utils;
