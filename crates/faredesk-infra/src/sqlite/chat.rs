//! SQLite chat repository implementation.
//!
//! Sessions, messages, and the monitoring event log. Entities and event
//! payloads are stored as JSON of their typed records.

use chrono::{DateTime, Utc};
use faredesk_core::repository::chat::ChatRepository;
use faredesk_types::chat::{
    ChatEvent, ChatMessage, ChatSession, ExtractedEntities, IntentKind, MessageRole, SessionStatus,
};
use faredesk_types::error::RepositoryError;
use faredesk_types::user::UserId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    user_id: String,
    platform: String,
    status: String,
    last_activity: String,
    created_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            platform: row.try_get("platform")?,
            status: row.try_get("status")?,
            last_activity: row.try_get("last_activity")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let user_id = self
            .user_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let status: SessionStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatSession {
            id,
            user_id,
            platform: self.platform,
            status,
            last_activity: parse_datetime(&self.last_activity)?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    intent: Option<String>,
    entities: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            intent: row.try_get("intent")?,
            entities: row.try_get("entities")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let intent: Option<IntentKind> = self
            .intent
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let entities: Option<ExtractedEntities> = self
            .entities
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid entities JSON: {e}")))?;

        Ok(ChatMessage {
            id,
            session_id,
            role,
            content: self.content,
            intent,
            entities,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            "INSERT INTO chat_sessions (id, user_id, platform, status, last_activity, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.platform)
        .bind(session.status.to_string())
        .bind(format_datetime(&session.last_activity))
        .bind(format_datetime(&session.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row =
                    SessionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row =
                SessionRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn set_session_status(
        &self,
        session_id: &Uuid,
        status: SessionStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn touch_session(
        &self,
        session_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET last_activity = ? WHERE id = ?")
            .bind(format_datetime(&at))
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let entities_json = message
            .entities
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, role, content, intent, entities, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(message.intent.map(|i| i.to_string()))
        .bind(entities_json)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn log_event(&self, event: &ChatEvent) -> Result<(), RepositoryError> {
        let data_json = serde_json::to_string(&event.data)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO chat_events (id, session_id, event_type, event_data, processing_ms, success, error, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(event.session_id.to_string())
        .bind(event.data.event_type())
        .bind(&data_json)
        .bind(event.processing_ms)
        .bind(event.success)
        .bind(&event.error)
        .bind(format_datetime(&event.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use faredesk_core::service::chat::ChatService;
    use faredesk_types::error::ChatError;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn setup_user(pool: &DatabasePool) -> UserId {
        let user_id = UserId::new();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, name, created_at) VALUES (?, ?, '', 'user', '', ?)",
        )
        .bind(user_id.to_string())
        .bind(format!("user-{user_id}@example.com"))
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();

        user_id
    }

    fn service(pool: &DatabasePool) -> ChatService<SqliteChatRepository> {
        ChatService::new(SqliteChatRepository::new(pool.clone()))
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let svc = service(&pool);

        let session = svc.create_session(&user, "web").await.unwrap();
        assert_eq!(session.status, SessionStatus::Active);

        let found = svc.get_session(&session.id, &user).await.unwrap();
        assert_eq!(found.platform, "web");
    }

    #[tokio::test]
    async fn test_session_scoped_to_owner() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let stranger = setup_user(&pool).await;
        let svc = service(&pool);

        let session = svc.create_session(&user, "web").await.unwrap();

        let err = svc.get_session(&session.id, &stranger).await.unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_handle_message_records_exchange() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let svc = service(&pool);

        let session = svc.create_session(&user, "web").await.unwrap();
        let exchange = svc
            .handle_message(&session.id, &user, "I want to cancel TKT-1a2b3c4d")
            .await
            .unwrap();

        assert_eq!(exchange.user_message.role, MessageRole::User);
        assert_eq!(
            exchange.user_message.intent,
            Some(IntentKind::TicketCancellation)
        );
        assert_eq!(
            exchange
                .user_message
                .entities
                .as_ref()
                .and_then(|e| e.ticket_number.as_deref()),
            Some("TKT-1a2b3c4d")
        );
        assert_eq!(exchange.assistant_message.role, MessageRole::Assistant);

        let messages = svc.get_messages(&session.id, &user).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_handle_message_logs_event() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let svc = service(&pool);

        let session = svc.create_session(&user, "web").await.unwrap();
        svc.handle_message(&session.id, &user, "where is my refund?")
            .await
            .unwrap();

        let (event_type, event_data): (String, String) = sqlx::query_as(
            "SELECT event_type, event_data FROM chat_events WHERE session_id = ?",
        )
        .bind(session.id.to_string())
        .fetch_one(&pool.reader)
        .await
        .unwrap();

        assert_eq!(event_type, "message");
        assert!(event_data.contains("refund_inquiry"));
    }

    #[tokio::test]
    async fn test_escalate_and_close() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let svc = service(&pool);

        let session = svc.create_session(&user, "web").await.unwrap();

        svc.escalate(&session.id, &user).await.unwrap();
        let escalated = svc.get_session(&session.id, &user).await.unwrap();
        assert_eq!(escalated.status, SessionStatus::Escalated);

        svc.close(&session.id, &user).await.unwrap();
        let closed = svc.get_session(&session.id, &user).await.unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let svc = service(&pool);

        svc.create_session(&user, "web").await.unwrap();
        svc.create_session(&user, "telegram").await.unwrap();

        let sessions = svc.list_sessions(&user).await.unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let pool = test_pool().await;
        let user = setup_user(&pool).await;
        let svc = service(&pool);

        let session = svc.create_session(&user, "web").await.unwrap();
        let err = svc
            .handle_message(&session.id, &user, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
    }
}
