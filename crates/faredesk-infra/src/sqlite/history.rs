//! SQLite ticket history implementation.
//!
//! Append-only audit trail. There is no update or delete statement in
//! this module, matching the trait.

use chrono::{DateTime, Utc};
use faredesk_core::repository::history::HistoryRepository;
use faredesk_types::error::RepositoryError;
use faredesk_types::history::{HistoryAction, TicketHistoryEntry};
use faredesk_types::ticket::TicketId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryRepository`.
pub struct SqliteHistoryRepository {
    pool: DatabasePool,
}

impl SqliteHistoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct HistoryRow {
    id: String,
    ticket_id: String,
    action: String,
    description: String,
    actor: String,
    created_at: String,
}

impl HistoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            ticket_id: row.try_get("ticket_id")?,
            action: row.try_get("action")?,
            description: row.try_get("description")?,
            actor: row.try_get("actor")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<TicketHistoryEntry, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid history id: {e}")))?;
        let ticket_id = self
            .ticket_id
            .parse::<TicketId>()
            .map_err(|e| RepositoryError::Query(format!("invalid ticket id: {e}")))?;
        let action: HistoryAction = self
            .action
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(TicketHistoryEntry {
            id,
            ticket_id,
            action,
            description: self.description,
            actor: self.actor,
            created_at,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, entry: &TicketHistoryEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO ticket_history (id, ticket_id, action, description, actor, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.ticket_id.to_string())
        .bind(entry.action.to_string())
        .bind(&entry.description)
        .bind(&entry.actor)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<TicketHistoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM ticket_history WHERE ticket_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(ticket_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let history_row =
                HistoryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            entries.push(history_row.into_entry()?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use faredesk_types::user::UserId;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn setup_ticket(pool: &DatabasePool) -> TicketId {
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

        let ticket_id = TicketId::new();
        sqlx::query(
            "INSERT INTO tickets (id, owner_id, number, status, subject, description, priority, price, currency, created_at, updated_at)
             VALUES (?, ?, ?, 'open', 'Subject', '', 'medium', 0, 'USD', ?, ?)",
        )
        .bind(ticket_id.to_string())
        .bind(user_id.to_string())
        .bind(format!("TKT-{}", &ticket_id.to_string()[..8]))
        .bind(Utc::now().to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();

        ticket_id
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let pool = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let ticket_id = setup_ticket(&pool).await;

        let entry =
            TicketHistoryEntry::new(ticket_id, HistoryAction::Created, "Ticket created", "system");
        repo.append(&entry).await.unwrap();

        let entries = repo.list_for_ticket(&ticket_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, HistoryAction::Created);
        assert_eq!(entries[0].actor, "system");
    }

    #[tokio::test]
    async fn test_list_ordered_ascending() {
        let pool = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let ticket_id = setup_ticket(&pool).await;

        let mut first =
            TicketHistoryEntry::new(ticket_id, HistoryAction::Created, "first", "system");
        first.created_at = Utc::now() - chrono::Duration::minutes(10);
        let second =
            TicketHistoryEntry::new(ticket_id, HistoryAction::StatusUpdated, "second", "system");

        // Append out of order; the read path sorts by creation time.
        repo.append(&second).await.unwrap();
        repo.append(&first).await.unwrap();

        let entries = repo.list_for_ticket(&ticket_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "first");
        assert_eq!(entries[1].description, "second");
    }

    #[tokio::test]
    async fn test_unknown_ticket_has_no_entries() {
        let pool = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());

        let entries = repo.list_for_ticket(&TicketId::new()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_all_actions_accepted() {
        let pool = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let ticket_id = setup_ticket(&pool).await;

        for action in [
            HistoryAction::Created,
            HistoryAction::StatusUpdated,
            HistoryAction::Cancelled,
        ] {
            let entry = TicketHistoryEntry::new(ticket_id, action, "", "system");
            repo.append(&entry).await.unwrap();
        }

        let entries = repo.list_for_ticket(&ticket_id).await.unwrap();
        assert_eq!(entries.len(), 3);
    }
}
