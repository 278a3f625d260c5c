//! Database layer: one process-wide pool, scoped statement execution

pub mod pool;

pub use pool::{close, pool, query, DbError, PoolConfig};
