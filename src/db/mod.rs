//! Database layer - connection handle, table schemas and the replace-then-append writer

pub mod pool;
pub mod schema;
pub mod sink;

pub use pool::{Pool, PoolArgsBuilder};
pub use schema::Schema;
pub use sink::TableWriter;
