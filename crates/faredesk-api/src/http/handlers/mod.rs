//! REST API request handlers.

pub mod auth;
pub mod chat;
pub mod refund;
pub mod ticket;
