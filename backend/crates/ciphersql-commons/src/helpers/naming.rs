//! Workspace namespace name derivation.
//!
//! A workspace name has the shape `ws_<readable>_<digest>`:
//!
//! - `ws_` keeps workspaces apart from application namespaces (`public`,
//!   `information_schema`, ...)
//! - `<readable>` is the lowercased assignment id with everything outside
//!   `[a-z0-9_]` stripped, cut to [`READABLE_PART_LEN`] characters, so
//!   operators can tell workspaces apart at a glance
//! - `<digest>` is the first [`DIGEST_HEX_LEN`] hex characters of SHA-256 over
//!   the raw id; ids that only differ in stripped characters still differ here

use sha2::{Digest, Sha256};

pub const WORKSPACE_PREFIX: &str = "ws_";
pub const READABLE_PART_LEN: usize = 24;
pub const DIGEST_HEX_LEN: usize = 16;

/// Derive the namespace name for an assignment id.
pub fn derive_workspace_name(assignment_id: &str) -> String {
    let readable: String = assignment_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .take(READABLE_PART_LEN)
        .collect();

    let digest = Sha256::digest(assignment_id.as_bytes());
    let digest_hex: String = format!("{:x}", digest).chars().take(DIGEST_HEX_LEN).collect();

    if readable.is_empty() {
        format!("{}{}", WORKSPACE_PREFIX, digest_hex)
    } else {
        format!("{}{}_{}", WORKSPACE_PREFIX, readable, digest_hex)
    }
}

/// True if `name` has the shape produced by [`derive_workspace_name`].
pub fn is_workspace_name(name: &str) -> bool {
    name.starts_with(WORKSPACE_PREFIX)
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
