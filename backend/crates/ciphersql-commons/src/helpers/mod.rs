//! Identifier helpers.

pub mod identifiers;
pub mod naming;

pub use identifiers::sanitize_identifier;
pub use naming::derive_workspace_name;
