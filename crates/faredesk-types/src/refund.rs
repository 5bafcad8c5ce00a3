//! Refund request types.
//!
//! A refund request tracks the amount and approval state of money to be
//! returned for a cancelled ticket. Requests join to tickets by the
//! external ticket number; multiple historical requests may exist per
//! ticket but only the most recently created one is operative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Approval state of a refund request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefundStatus::Pending => write!(f, "pending"),
            RefundStatus::Approved => write!(f, "approved"),
            RefundStatus::Rejected => write!(f, "rejected"),
            RefundStatus::Processed => write!(f, "processed"),
        }
    }
}

impl FromStr for RefundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RefundStatus::Pending),
            "approved" => Ok(RefundStatus::Approved),
            "rejected" => Ok(RefundStatus::Rejected),
            "processed" => Ok(RefundStatus::Processed),
            other => Err(format!("invalid refund status: '{other}'")),
        }
    }
}

/// A request to return money for a cancelled ticket.
///
/// `amount` and `currency` are fixed at creation and never change
/// afterwards; resolution only touches `status`, `processed_by`, and
/// `processed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub id: Uuid,
    /// External ticket number, the join key to the tickets table.
    pub ticket_number: String,
    /// User id, or "system" for bot-initiated cancellations.
    pub requested_by: String,
    pub reason: String,
    pub status: RefundStatus,
    pub amount: f64,
    pub currency: String,
    /// Agent id, set when the request is resolved.
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefundRequest {
    /// Build a fresh pending request for a ticket cancellation.
    pub fn pending(
        ticket_number: &str,
        requested_by: &str,
        reason: &str,
        amount: f64,
        currency: &str,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            ticket_number: ticket_number.to_string(),
            requested_by: requested_by.to_string(),
            reason: reason.to_string(),
            status: RefundStatus::Pending,
            amount,
            currency: currency.to_string(),
            processed_by: None,
            processed_at: None,
            notes: None,
            created_at: Utc::now(),
        }
    }
}
