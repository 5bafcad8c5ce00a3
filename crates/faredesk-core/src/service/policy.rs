//! Refund policy calculator.
//!
//! A pure function from ticket attributes to a refund amount. The rate
//! table is deliberately this simple two-tier placeholder; it does not
//! model time-to-departure or airline cancellation rules.

use faredesk_types::error::TicketError;
use faredesk_types::ticket::{Ticket, TicketType};

/// Refund rate for charter tickets.
pub const CHARTER_REFUND_RATE: f64 = 0.5;

/// Refund rate for systematic tickets.
pub const SYSTEMATIC_REFUND_RATE: f64 = 0.8;

/// Compute the refund amount for a ticket: `price * rate(ticket_type)`.
///
/// A ticket without a fare class (a plain support ticket) has no refund
/// policy and fails validation, as does any unknown type at the parsing
/// boundary.
pub fn refund_amount(ticket: &Ticket) -> Result<f64, TicketError> {
    match ticket.ticket_type {
        Some(TicketType::Charter) => Ok(ticket.price * CHARTER_REFUND_RATE),
        Some(TicketType::Systematic) => Ok(ticket.price * SYSTEMATIC_REFUND_RATE),
        None => Err(TicketError::Validation("invalid ticket type".to_string())),
    }
}
