pub mod standard;

pub use standard::{parse_sql, tokenize_sql};
