//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure
//! layer (faredesk-infra) implements. The core crate never depends on
//! any specific storage technology.
//!
//! Multi-row operations with consistency requirements (cancellation,
//! refund resolution) are single trait methods: the implementation owns
//! the transaction, so either every row changes or none does.

pub mod chat;
pub mod history;
pub mod refund;
pub mod ticket;
pub mod user;
