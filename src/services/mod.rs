//! Normalization services.
//!
//! The leaf components every schedule passes through:
//! - Date and timestamp parsing (`DateTimeNormalizer`)
//! - Class designator expansion (`ClassSetResolver`)
//! - Type classification and coloring (`TypeClassifier`, `ColorProvider`)
//! - Info text parsing (`DescriptionParser`)
//! - Struck-through cell values (`cells`)

pub mod cells;
mod classes;
pub mod colors;
pub mod dates;
mod description;
mod types;

pub use cells::{ChangedValue, parse_changed_value};
pub use classes::{ClassSetResolver, CompiledClassRange};
pub use colors::ColorProvider;
pub use dates::{DatePatterns, DateTimeNormalizer};
pub use description::DescriptionParser;
pub use types::TypeClassifier;
