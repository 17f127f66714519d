//! Workspace namespaces held by the sandbox.

pub mod workspace_catalog;

pub use workspace_catalog::{SeededTable, Workspace, WorkspaceCatalog, WorkspaceInfo};

/// Catalog every sandbox session resolves unqualified names in.
pub const SANDBOX_CATALOG: &str = "sandbox";

/// Schema that points at the bound workspace inside [`SANDBOX_CATALOG`].
pub const WORKSPACE_SCHEMA: &str = "workspace";

/// Shared, application-owned schema readable from every session.
pub const PUBLIC_SCHEMA: &str = "public";
