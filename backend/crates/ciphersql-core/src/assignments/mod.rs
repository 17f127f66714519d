//! Assignment lookup.

pub mod store;

pub use store::{AssignmentStore, InMemoryAssignmentStore};
