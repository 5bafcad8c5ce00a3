//! Business logic and repository trait definitions for faredesk.
//!
//! This crate defines the "ports" (repository traits) that the
//! infrastructure layer implements, plus the services that orchestrate
//! them: the ticket lifecycle engine, the refund policy calculator, the
//! chat service with its keyword intent router, and authentication. It
//! depends only on `faredesk-types` -- never on `faredesk-infra` or any
//! database/IO crate.

pub mod repository;
pub mod service;
