//! Chat repository trait definition.
//!
//! Provides persistence for chat sessions, messages, and the monitoring
//! event log. Follows the same RPITIT pattern as TicketRepository.

use chrono::{DateTime, Utc};
use faredesk_types::chat::{ChatEvent, ChatMessage, ChatSession, SessionStatus};
use faredesk_types::error::RepositoryError;
use faredesk_types::user::UserId;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List sessions for a user, newest first.
    fn list_sessions_for_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Update a session's lifecycle status.
    fn set_session_status(
        &self,
        session_id: &Uuid,
        status: SessionStatus,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Bump a session's last_activity timestamp.
    fn touch_session(
        &self,
        session_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Save a new message within a session.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a session, ordered by created_at ASC.
    fn list_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Record a monitoring event.
    fn log_event(
        &self,
        event: &ChatEvent,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
