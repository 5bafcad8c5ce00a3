//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. Multi-row operations with consistency
//! requirements run inside transactions on the single-connection writer
//! pool.

pub mod chat;
pub mod history;
pub mod pool;
pub mod refund;
pub mod ticket;
pub mod user;
