//! Sandboxed query execution on DataFusion.

pub mod datafusion_session;
pub mod executor;
pub mod result_translator;
pub mod session_pool;

pub use datafusion_session::DataFusionSessionFactory;
pub use executor::{ExecutionOutput, QueryExecutor};
pub use result_translator::translate_output;
pub use session_pool::{PooledSession, SessionPool};
