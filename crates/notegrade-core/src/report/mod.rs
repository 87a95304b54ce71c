pub mod comparison;
pub mod console;
pub mod json;
pub mod progress;

pub use comparison::{summarize, ComparisonReport, Insight, VariantAggregate};
pub use json::{OutcomeDocument, SCHEMA_VERSION};
