//! Workspace provisioning.

pub mod provisioner;

pub use provisioner::{TablePlan, WorkspaceProvisioner};
