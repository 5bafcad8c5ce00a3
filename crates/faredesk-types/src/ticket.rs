use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::refund::RefundStatus;
use crate::user::UserId;

/// Unique identifier for a ticket, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub Uuid);

impl TicketId {
    /// Create a new TicketId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a TicketId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A support/booking ticket with a lifecycle status and monetary price.
///
/// Tickets created through the support API start `open` with no price.
/// Tickets sold through the booking pipeline enter the store `active`
/// with a price, type, and currency; only those can be cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub owner_id: UserId,
    /// Human-facing ticket number ("TKT-1a2b3c4d"). Globally unique,
    /// immutable after creation.
    pub number: String,
    /// Current lifecycle state.
    pub status: TicketStatus,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    /// Fare class of a sold ticket. Absent on plain support tickets.
    pub ticket_type: Option<TicketType>,
    /// Fixed at creation; never mutated by cancellation.
    pub price: f64,
    pub currency: String,
    /// Mirror of the latest refund request's status, kept in sync by the
    /// refund-resolution transaction.
    pub refund_status: Option<RefundStatus>,
    pub refund_amount: Option<f64>,
    pub refund_processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket lifecycle states.
///
/// - Open: created through the support API
/// - Active: sold ticket imported from the booking pipeline; the only
///   state Cancel accepts
/// - InProgress/Resolved/Closed: generic support flow
/// - Cancelled: terminal, reached only via Cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Active,
    InProgress,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    /// Statuses an owner may set through UpdateStatus. Active and
    /// Cancelled are owned by the booking pipeline and Cancel respectively.
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            TicketStatus::Open
                | TicketStatus::InProgress
                | TicketStatus::Resolved
                | TicketStatus::Closed
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::Active => write!(f, "active"),
            TicketStatus::InProgress => write!(f, "in_progress"),
            TicketStatus::Resolved => write!(f, "resolved"),
            TicketStatus::Closed => write!(f, "closed"),
            TicketStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "active" => Ok(TicketStatus::Active),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            "cancelled" => Ok(TicketStatus::Cancelled),
            other => Err(format!("invalid ticket status: '{other}'")),
        }
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Open
    }
}

/// Fare class of a sold ticket. Drives the refund rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Charter,
    Systematic,
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketType::Charter => write!(f, "charter"),
            TicketType::Systematic => write!(f, "systematic"),
        }
    }
}

impl FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "charter" => Ok(TicketType::Charter),
            "systematic" => Ok(TicketType::Systematic),
            other => Err(format!("invalid ticket type: '{other}'")),
        }
    }
}

/// Support ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketPriority::Low => write!(f, "low"),
            TicketPriority::Medium => write!(f, "medium"),
            TicketPriority::High => write!(f, "high"),
        }
    }
}

impl FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            other => Err(format!("invalid ticket priority: '{other}'")),
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Medium
    }
}

/// Request to create a new support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub description: String,
    pub priority: String,
}

/// Generate a human-facing ticket number: "TKT-" plus eight hex
/// characters from the random tail of a fresh UUID. The leading UUID v7
/// characters are timestamp bits and would collide for tickets created
/// close together.
pub fn generate_ticket_number() -> String {
    let uuid = Uuid::now_v7().simple().to_string();
    format!("TKT-{}", &uuid[uuid.len() - 8..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_display_roundtrip() {
        let id = TicketId::new();
        let s = id.to_string();
        let parsed: TicketId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_ticket_status_roundtrip() {
        for status in [
            TicketStatus::Open,
            TicketStatus::Active,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
            TicketStatus::Cancelled,
        ] {
            let s = status.to_string();
            let parsed: TicketStatus = s.parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_ticket_status_settable() {
        assert!(TicketStatus::Open.is_settable());
        assert!(TicketStatus::InProgress.is_settable());
        assert!(TicketStatus::Resolved.is_settable());
        assert!(TicketStatus::Closed.is_settable());
        assert!(!TicketStatus::Active.is_settable());
        assert!(!TicketStatus::Cancelled.is_settable());
    }

    #[test]
    fn test_ticket_status_serde_snake_case() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_ticket_type_roundtrip() {
        for ty in [TicketType::Charter, TicketType::Systematic] {
            let s = ty.to_string();
            let parsed: TicketType = s.parse().unwrap();
            assert_eq!(ty, parsed);
        }
    }

    #[test]
    fn test_ticket_type_rejects_unknown() {
        let err = "economy".parse::<TicketType>().unwrap_err();
        assert!(err.contains("invalid ticket type"));
    }

    #[test]
    fn test_priority_roundtrip() {
        for p in [
            TicketPriority::Low,
            TicketPriority::Medium,
            TicketPriority::High,
        ] {
            let s = p.to_string();
            let parsed: TicketPriority = s.parse().unwrap();
            assert_eq!(p, parsed);
        }
    }

    #[test]
    fn test_generate_ticket_number_format() {
        let number = generate_ticket_number();
        assert!(number.starts_with("TKT-"));
        assert_eq!(number.len(), 12);
    }

    #[test]
    fn test_generate_ticket_number_unique() {
        let a = generate_ticket_number();
        let b = generate_ticket_number();
        assert_ne!(a, b);
    }
}
