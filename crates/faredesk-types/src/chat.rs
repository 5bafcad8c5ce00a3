//! Chat session, message, and intent types.
//!
//! These types model support conversations between users and the
//! intent-routing bot: sessions, messages with their detected intent,
//! and the monitoring event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Lifecycle status of a chat session.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('active', 'escalated', 'closed'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Escalated,
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Escalated => write!(f, "escalated"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "escalated" => Ok(SessionStatus::Escalated),
            "closed" => Ok(SessionStatus::Closed),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Active
    }
}

/// A chat session between a user and the support bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: UserId,
    /// Where the conversation originates ("web", "telegram", ...).
    pub platform: String,
    pub status: SessionStatus,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a chat session, ordered by `created_at`.
///
/// User messages carry the intent the router detected for them;
/// assistant messages carry neither intent nor entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub intent: Option<IntentKind>,
    pub entities: Option<ExtractedEntities>,
    pub created_at: DateTime<Utc>,
}

/// The closed set of intents the keyword router can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    TicketLookup,
    TicketCancellation,
    RefundInquiry,
    BaggagePolicy,
    GeneralInquiry,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentKind::TicketLookup => write!(f, "ticket_lookup"),
            IntentKind::TicketCancellation => write!(f, "ticket_cancellation"),
            IntentKind::RefundInquiry => write!(f, "refund_inquiry"),
            IntentKind::BaggagePolicy => write!(f, "baggage_policy"),
            IntentKind::GeneralInquiry => write!(f, "general_inquiry"),
        }
    }
}

impl FromStr for IntentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ticket_lookup" => Ok(IntentKind::TicketLookup),
            "ticket_cancellation" => Ok(IntentKind::TicketCancellation),
            "refund_inquiry" => Ok(IntentKind::RefundInquiry),
            "baggage_policy" => Ok(IntentKind::BaggagePolicy),
            "general_inquiry" => Ok(IntentKind::GeneralInquiry),
            other => Err(format!("invalid intent: '{other}'")),
        }
    }
}

/// A detected intent with its confidence score and extracted entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub score: f64,
    pub entities: ExtractedEntities,
}

/// Entities pulled out of a user message.
///
/// Explicit fields rather than an open map: the extractor only knows
/// about these three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.ticket_number.is_none() && self.phone_number.is_none() && self.email.is_none()
    }
}

/// Typed payload of a monitoring event, tagged by event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEventData {
    /// A user message was processed end to end.
    Message {
        intent: IntentKind,
        entities: ExtractedEntities,
    },
    /// The session was handed off to a human agent.
    Escalated,
    /// The session was closed.
    Closed,
}

impl ChatEventData {
    /// The event_type column value for this payload.
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatEventData::Message { .. } => "message",
            ChatEventData::Escalated => "escalated",
            ChatEventData::Closed => "closed",
        }
    }
}

/// One entry in the chat monitoring log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub id: Uuid,
    pub session_id: Uuid,
    pub data: ChatEventData,
    pub processing_ms: i64,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}
