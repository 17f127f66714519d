//! Data model shared across the sandbox crates.

pub mod assignment;
pub mod ids;
pub mod types;

pub use assignment::{AssignmentDefinition, ColumnDefinition, SampleTableDefinition, SeedRow};
pub use ids::{AssignmentId, WorkspaceName};
pub use types::{LogicalType, ToArrowType};
