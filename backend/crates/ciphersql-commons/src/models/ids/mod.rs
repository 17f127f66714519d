//! Type-safe identifier wrappers.

mod assignment_id;
mod workspace_name;

pub use assignment_id::AssignmentId;
pub use workspace_name::WorkspaceName;
