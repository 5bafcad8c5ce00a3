//! Append-only ticket history entries.
//!
//! Every lifecycle-affecting operation writes exactly one entry. Entries
//! are never updated or deleted once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::ticket::TicketId;

/// What happened to the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    StatusUpdated,
    Cancelled,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryAction::Created => write!(f, "created"),
            HistoryAction::StatusUpdated => write!(f, "status_updated"),
            HistoryAction::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(HistoryAction::Created),
            "status_updated" => Ok(HistoryAction::StatusUpdated),
            "cancelled" => Ok(HistoryAction::Cancelled),
            other => Err(format!("invalid history action: '{other}'")),
        }
    }
}

/// One write-once entry in a ticket's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketHistoryEntry {
    pub id: Uuid,
    pub ticket_id: TicketId,
    pub action: HistoryAction,
    pub description: String,
    /// User id, or "system" for operations without a logged-in actor.
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl TicketHistoryEntry {
    pub fn new(ticket_id: TicketId, action: HistoryAction, description: &str, actor: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            ticket_id,
            action,
            description: description.to_string(),
            actor: actor.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_action_roundtrip() {
        for action in [
            HistoryAction::Created,
            HistoryAction::StatusUpdated,
            HistoryAction::Cancelled,
        ] {
            let s = action.to_string();
            let parsed: HistoryAction = s.parse().unwrap();
            assert_eq!(action, parsed);
        }
    }

    #[test]
    fn test_history_action_serde_snake_case() {
        let json = serde_json::to_string(&HistoryAction::StatusUpdated).unwrap();
        assert_eq!(json, "\"status_updated\"");
    }

    #[test]
    fn test_entry_constructor() {
        let ticket_id = TicketId::new();
        let entry =
            TicketHistoryEntry::new(ticket_id, HistoryAction::Cancelled, "changed plans", "system");
        assert_eq!(entry.ticket_id, ticket_id);
        assert_eq!(entry.action, HistoryAction::Cancelled);
        assert_eq!(entry.actor, "system");
    }
}
