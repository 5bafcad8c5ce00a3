//! Shared domain types for faredesk.
//!
//! This crate contains the core domain types used across the faredesk
//! backend: Ticket, RefundRequest, TicketHistoryEntry, chat types, User,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod refund;
pub mod ticket;
pub mod user;
