//! Request, result and report models exposed by the sandbox.

pub mod query_result;
pub mod report;

pub use query_result::{ColumnInfo, QueryRequest, QueryResponse, QueryResult};
pub use report::{ProvisionReport, QueryPhase, QueryReport};
