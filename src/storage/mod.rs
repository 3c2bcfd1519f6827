pub mod error;
pub mod json_log;
pub mod sql;

pub use error::PersistenceError;
pub use json_log::JsonLog;
pub use sql::SqlSink;
