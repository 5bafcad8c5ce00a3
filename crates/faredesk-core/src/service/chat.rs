//! Chat service: session bookkeeping and bot message handling.
//!
//! Each incoming message is routed through the intent detector, answered
//! with the canned response for the intent, and recorded together with
//! the assistant reply. A monitoring event is logged after the exchange;
//! that log write is best-effort and is the only place in the system
//! where a failure is deliberately swallowed.

use chrono::Utc;
use faredesk_types::chat::{
    ChatEvent, ChatEventData, ChatMessage, ChatSession, IntentKind, MessageRole, SessionStatus,
};
use faredesk_types::error::{ChatError, RepositoryError};
use faredesk_types::user::UserId;
use uuid::Uuid;

use crate::repository::chat::ChatRepository;
use crate::service::intent::IntentDetector;

/// One user message and the bot's reply to it.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

/// Service orchestrating chat sessions and the intent-routing bot.
pub struct ChatService<C: ChatRepository> {
    chat_repo: C,
    detector: IntentDetector,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(chat_repo: C) -> Self {
        Self {
            chat_repo,
            detector: IntentDetector::new(),
        }
    }

    /// Start a new session for a user.
    pub async fn create_session(
        &self,
        user_id: &UserId,
        platform: &str,
    ) -> Result<ChatSession, ChatError> {
        let platform = platform.trim();
        if platform.is_empty() {
            return Err(ChatError::Validation(
                "platform cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id: *user_id,
            platform: platform.to_string(),
            status: SessionStatus::Active,
            last_activity: now,
            created_at: now,
        };

        self.chat_repo
            .create_session(&session)
            .await
            .map_err(map_storage)
    }

    /// List a user's sessions, newest first.
    pub async fn list_sessions(&self, user_id: &UserId) -> Result<Vec<ChatSession>, ChatError> {
        self.chat_repo
            .list_sessions_for_user(user_id)
            .await
            .map_err(map_storage)
    }

    /// Get a session, scoped to its owner.
    pub async fn get_session(
        &self,
        session_id: &Uuid,
        user_id: &UserId,
    ) -> Result<ChatSession, ChatError> {
        let session = self
            .chat_repo
            .get_session(session_id)
            .await
            .map_err(map_storage)?
            .ok_or(ChatError::SessionNotFound)?;

        if session.user_id != *user_id {
            return Err(ChatError::SessionNotFound);
        }

        Ok(session)
    }

    /// Process one user message: detect intent, store the message,
    /// generate and store the bot reply, bump session activity, and log
    /// a monitoring event (best-effort).
    pub async fn handle_message(
        &self,
        session_id: &Uuid,
        user_id: &UserId,
        content: &str,
    ) -> Result<ChatExchange, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::Validation("content cannot be empty".to_string()));
        }

        let session = self.get_session(session_id, user_id).await?;
        let started = std::time::Instant::now();

        let intent = self.detector.detect(content);

        let user_message = ChatMessage {
            id: Uuid::now_v7(),
            session_id: session.id,
            role: MessageRole::User,
            content: content.to_string(),
            intent: Some(intent.kind),
            entities: Some(intent.entities.clone()),
            created_at: Utc::now(),
        };
        self.chat_repo
            .save_message(&user_message)
            .await
            .map_err(map_storage)?;

        let assistant_message = ChatMessage {
            id: Uuid::now_v7(),
            session_id: session.id,
            role: MessageRole::Assistant,
            content: canned_response(intent.kind).to_string(),
            intent: None,
            entities: None,
            created_at: Utc::now(),
        };
        self.chat_repo
            .save_message(&assistant_message)
            .await
            .map_err(map_storage)?;

        self.chat_repo
            .touch_session(&session.id, Utc::now())
            .await
            .map_err(map_storage)?;

        // Best-effort monitoring log; a failure here never fails the
        // exchange that already succeeded.
        let event = ChatEvent {
            id: Uuid::now_v7(),
            session_id: session.id,
            data: ChatEventData::Message {
                intent: intent.kind,
                entities: intent.entities,
            },
            processing_ms: started.elapsed().as_millis() as i64,
            success: true,
            error: None,
            created_at: Utc::now(),
        };
        if let Err(e) = self.chat_repo.log_event(&event).await {
            tracing::warn!(session_id = %session.id, error = %e, "failed to log chat event");
        }

        Ok(ChatExchange {
            user_message,
            assistant_message,
        })
    }

    /// Messages for a session, oldest first.
    pub async fn get_messages(
        &self,
        session_id: &Uuid,
        user_id: &UserId,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let session = self.get_session(session_id, user_id).await?;
        self.chat_repo
            .list_messages(&session.id)
            .await
            .map_err(map_storage)
    }

    /// Hand a session off to a human agent.
    pub async fn escalate(&self, session_id: &Uuid, user_id: &UserId) -> Result<(), ChatError> {
        let session = self.get_session(session_id, user_id).await?;
        self.chat_repo
            .set_session_status(&session.id, SessionStatus::Escalated)
            .await
            .map_err(map_storage)
    }

    /// Close a session.
    pub async fn close(&self, session_id: &Uuid, user_id: &UserId) -> Result<(), ChatError> {
        let session = self.get_session(session_id, user_id).await?;
        self.chat_repo
            .set_session_status(&session.id, SessionStatus::Closed)
            .await
            .map_err(map_storage)
    }
}

/// The bot's reply for a detected intent.
fn canned_response(kind: IntentKind) -> &'static str {
    match kind {
        IntentKind::TicketLookup => {
            "I can help you find your ticket. Could you please provide your ticket number or booking reference?"
        }
        IntentKind::TicketCancellation => {
            "I can help you cancel your ticket. Could you please provide your ticket number?"
        }
        IntentKind::RefundInquiry => {
            "I can help you check your refund status. Could you please provide your ticket number?"
        }
        IntentKind::BaggagePolicy => {
            "I can help you with baggage policy information. Which airline are you flying with?"
        }
        IntentKind::GeneralInquiry => {
            "I'm not sure I understand. Could you please rephrase your question?"
        }
    }
}

fn map_storage(e: RepositoryError) -> ChatError {
    ChatError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_response_covers_all_intents() {
        for kind in [
            IntentKind::TicketLookup,
            IntentKind::TicketCancellation,
            IntentKind::RefundInquiry,
            IntentKind::BaggagePolicy,
            IntentKind::GeneralInquiry,
        ] {
            assert!(!canned_response(kind).is_empty());
        }
    }

    #[test]
    fn test_cancellation_response_asks_for_number() {
        assert!(canned_response(IntentKind::TicketCancellation).contains("ticket number"));
    }
}
