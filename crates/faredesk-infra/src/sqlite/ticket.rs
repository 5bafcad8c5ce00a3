//! SQLite ticket repository implementation.
//!
//! Implements `TicketRepository` from `faredesk-core` using sqlx with
//! split read/write pools. The compound operations (`create`, `cancel`)
//! wrap every row they touch in a single transaction on the
//! single-connection writer pool, so concurrent lifecycle operations on
//! the same ticket are serialized and partial state is never committed.

use chrono::{DateTime, Utc};
use faredesk_core::repository::ticket::TicketRepository;
use faredesk_types::error::RepositoryError;
use faredesk_types::history::TicketHistoryEntry;
use faredesk_types::refund::{RefundRequest, RefundStatus};
use faredesk_types::ticket::{Ticket, TicketId, TicketPriority, TicketStatus, TicketType};
use faredesk_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TicketRepository`.
pub struct SqliteTicketRepository {
    pool: DatabasePool,
}

impl SqliteTicketRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to the domain Ticket.
struct TicketRow {
    id: String,
    owner_id: String,
    number: String,
    status: String,
    subject: String,
    description: String,
    priority: String,
    ticket_type: Option<String>,
    price: f64,
    currency: String,
    refund_status: Option<String>,
    refund_amount: Option<f64>,
    refund_processed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TicketRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            number: row.try_get("number")?,
            status: row.try_get("status")?,
            subject: row.try_get("subject")?,
            description: row.try_get("description")?,
            priority: row.try_get("priority")?,
            ticket_type: row.try_get("ticket_type")?,
            price: row.try_get("price")?,
            currency: row.try_get("currency")?,
            refund_status: row.try_get("refund_status")?,
            refund_amount: row.try_get("refund_amount")?,
            refund_processed_at: row.try_get("refund_processed_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_ticket(self) -> Result<Ticket, RepositoryError> {
        let id = self
            .id
            .parse::<TicketId>()
            .map_err(|e| RepositoryError::Query(format!("invalid ticket id: {e}")))?;

        let owner_id = self
            .owner_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid owner id: {e}")))?;

        let status: TicketStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let priority: TicketPriority = self
            .priority
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let ticket_type: Option<TicketType> = self
            .ticket_type
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let refund_status: Option<RefundStatus> = self
            .refund_status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;
        let refund_processed_at = self
            .refund_processed_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?;

        Ok(Ticket {
            id,
            owner_id,
            number: self.number,
            status,
            subject: self.subject,
            description: self.description,
            priority,
            ticket_type,
            price: self.price,
            currency: self.currency,
            refund_status,
            refund_amount: self.refund_amount,
            refund_processed_at,
            created_at,
            updated_at,
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

/// Bind helper: INSERT a ticket row inside an arbitrary executor.
async fn insert_ticket<'e, E>(executor: E, ticket: &Ticket) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO tickets (id, owner_id, number, status, subject, description, priority, ticket_type, price, currency, refund_status, refund_amount, refund_processed_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(ticket.id.to_string())
    .bind(ticket.owner_id.to_string())
    .bind(&ticket.number)
    .bind(ticket.status.to_string())
    .bind(&ticket.subject)
    .bind(&ticket.description)
    .bind(ticket.priority.to_string())
    .bind(ticket.ticket_type.map(|t| t.to_string()))
    .bind(ticket.price)
    .bind(&ticket.currency)
    .bind(ticket.refund_status.map(|s| s.to_string()))
    .bind(ticket.refund_amount)
    .bind(ticket.refund_processed_at.as_ref().map(format_datetime))
    .bind(format_datetime(&ticket.created_at))
    .bind(format_datetime(&ticket.updated_at))
    .execute(executor)
    .await?;

    Ok(())
}

/// Bind helper: INSERT a history row inside an arbitrary executor.
async fn insert_history<'e, E>(executor: E, entry: &TicketHistoryEntry) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO ticket_history (id, ticket_id, action, description, actor, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.id.to_string())
    .bind(entry.ticket_id.to_string())
    .bind(entry.action.to_string())
    .bind(&entry.description)
    .bind(&entry.actor)
    .bind(format_datetime(&entry.created_at))
    .execute(executor)
    .await?;

    Ok(())
}

/// Bind helper: INSERT a refund request row inside an arbitrary executor.
async fn insert_refund<'e, E>(executor: E, refund: &RefundRequest) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO refund_requests (id, ticket_number, requested_by, reason, status, amount, currency, processed_by, processed_at, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(refund.id.to_string())
    .bind(&refund.ticket_number)
    .bind(&refund.requested_by)
    .bind(&refund.reason)
    .bind(refund.status.to_string())
    .bind(refund.amount)
    .bind(&refund.currency)
    .bind(&refund.processed_by)
    .bind(refund.processed_at.as_ref().map(format_datetime))
    .bind(&refund.notes)
    .bind(format_datetime(&refund.created_at))
    .execute(executor)
    .await?;

    Ok(())
}

fn map_insert_error(e: sqlx::Error, number: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.message().contains("UNIQUE") {
            return RepositoryError::Conflict(format!("ticket number '{number}' already exists"));
        }
    }
    RepositoryError::Query(e.to_string())
}

impl TicketRepository for SqliteTicketRepository {
    async fn create(
        &self,
        ticket: &Ticket,
        history: &TicketHistoryEntry,
    ) -> Result<Ticket, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_ticket(&mut *tx, ticket)
            .await
            .map_err(|e| map_insert_error(e, &ticket.number))?;

        insert_history(&mut *tx, history)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(ticket.clone())
    }

    async fn import(&self, ticket: &Ticket) -> Result<Ticket, RepositoryError> {
        insert_ticket(&self.pool.writer, ticket)
            .await
            .map_err(|e| map_insert_error(e, &ticket.number))?;

        Ok(ticket.clone())
    }

    async fn get_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM tickets WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let ticket_row =
                    TicketRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(ticket_row.into_ticket()?))
            }
            None => Ok(None),
        }
    }

    async fn get_by_number(&self, number: &str) -> Result<Option<Ticket>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM tickets WHERE number = ?")
            .bind(number)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let ticket_row =
                    TicketRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(ticket_row.into_ticket()?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Ticket>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM tickets WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut tickets = Vec::with_capacity(rows.len());
        for row in &rows {
            let ticket_row =
                TicketRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            tickets.push(ticket_row.into_ticket()?);
        }

        Ok(tickets)
    }

    async fn set_status(
        &self,
        id: &TicketId,
        status: TicketStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE tickets SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(format_datetime(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn cancel(
        &self,
        number: &str,
        refund: &RefundRequest,
        history: &TicketHistoryEntry,
    ) -> Result<Ticket, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Re-read inside the transaction: the caller's earlier read may
        // be stale by the time we get the writer connection.
        let row = sqlx::query("SELECT * FROM tickets WHERE number = ?")
            .bind(number)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        let ticket_row =
            TicketRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        let mut ticket = ticket_row.into_ticket()?;

        if ticket.status != TicketStatus::Active {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::InvalidState(ticket.status.to_string()));
        }

        let now = Utc::now();
        sqlx::query("UPDATE tickets SET status = ?, updated_at = ? WHERE id = ?")
            .bind(TicketStatus::Cancelled.to_string())
            .bind(format_datetime(&now))
            .bind(ticket.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_refund(&mut *tx, refund)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_history(&mut *tx, history)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        ticket.status = TicketStatus::Cancelled;
        ticket.updated_at = now;
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::history::SqliteHistoryRepository;
    use crate::sqlite::pool::DatabasePool;
    use crate::sqlite::refund::SqliteRefundRepository;
    use faredesk_core::repository::history::HistoryRepository;
    use faredesk_core::repository::refund::RefundRepository;
    use faredesk_core::service::ticket::TicketService;
    use faredesk_types::error::TicketError;
    use faredesk_types::history::HistoryAction;
    use faredesk_types::ticket::{generate_ticket_number, CreateTicketRequest};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn setup_user(pool: &DatabasePool) -> UserId {
        let user_id = UserId::new();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, name, created_at) VALUES (?, ?, '', 'user', 'Test User', ?)",
        )
        .bind(user_id.to_string())
        .bind(format!("user-{user_id}@example.com"))
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();

        user_id
    }

    fn make_sold_ticket(owner: UserId, ticket_type: TicketType, price: f64) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: TicketId::new(),
            owner_id: owner,
            number: generate_ticket_number(),
            status: TicketStatus::Active,
            subject: "Flight booking".to_string(),
            description: String::new(),
            priority: TicketPriority::Medium,
            ticket_type: Some(ticket_type),
            price,
            currency: "USD".to_string(),
            refund_status: None,
            refund_amount: None,
            refund_processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        pool: &DatabasePool,
    ) -> TicketService<SqliteTicketRepository, SqliteRefundRepository, SqliteHistoryRepository>
    {
        TicketService::new(
            SqliteTicketRepository::new(pool.clone()),
            SqliteRefundRepository::new(pool.clone()),
            SqliteHistoryRepository::new(pool.clone()),
            "USD".to_string(),
        )
    }

    #[tokio::test]
    async fn test_import_and_get_by_number() {
        let pool = test_pool().await;
        let repo = SqliteTicketRepository::new(pool.clone());
        let owner = setup_user(&pool).await;
        let ticket = make_sold_ticket(owner, TicketType::Charter, 500.0);

        repo.import(&ticket).await.unwrap();

        let found = repo.get_by_number(&ticket.number).await.unwrap().unwrap();
        assert_eq!(found.id, ticket.id);
        assert_eq!(found.status, TicketStatus::Active);
        assert_eq!(found.ticket_type, Some(TicketType::Charter));
        assert_eq!(found.price, 500.0);
    }

    #[tokio::test]
    async fn test_duplicate_number_conflict() {
        let pool = test_pool().await;
        let repo = SqliteTicketRepository::new(pool.clone());
        let owner = setup_user(&pool).await;

        let ticket1 = make_sold_ticket(owner, TicketType::Charter, 100.0);
        let mut ticket2 = make_sold_ticket(owner, TicketType::Charter, 200.0);
        ticket2.number = ticket1.number.clone();

        repo.import(&ticket1).await.unwrap();
        let err = repo.import(&ticket2).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_writes_history_atomically() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = svc
            .create_ticket(
                &owner,
                CreateTicketRequest {
                    subject: "Lost booking".to_string(),
                    description: "Cannot find my booking".to_string(),
                    priority: "high".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.number.starts_with("TKT-"));

        let history = svc.get_history(&ticket.id, &owner).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Created);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_priority() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let err = svc
            .create_ticket(
                &owner,
                CreateTicketRequest {
                    subject: "Hello".to_string(),
                    description: String::new(),
                    priority: "urgent".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_ticket_scoped_to_owner() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let stranger = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = svc
            .create_ticket(
                &owner,
                CreateTicketRequest {
                    subject: "Mine".to_string(),
                    description: String::new(),
                    priority: "low".to_string(),
                },
            )
            .await
            .unwrap();

        let err = svc.get_ticket(&ticket.id, &stranger).await.unwrap_err();
        assert!(matches!(err, TicketError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_status_appends_history() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = svc
            .create_ticket(
                &owner,
                CreateTicketRequest {
                    subject: "Slow site".to_string(),
                    description: String::new(),
                    priority: "medium".to_string(),
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update_status(&ticket.id, &owner, TicketStatus::InProgress, "Taking a look")
            .await
            .unwrap();
        assert_eq!(updated.status, TicketStatus::InProgress);

        let history = svc.get_history(&ticket.id, &owner).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, HistoryAction::StatusUpdated);
        assert_eq!(history[1].description, "Taking a look");
    }

    #[tokio::test]
    async fn test_update_status_rejects_cancelled() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = svc
            .create_ticket(
                &owner,
                CreateTicketRequest {
                    subject: "Hello".to_string(),
                    description: String::new(),
                    priority: "low".to_string(),
                },
            )
            .await
            .unwrap();

        let err = svc
            .update_status(&ticket.id, &owner, TicketStatus::Cancelled, "")
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancel_systematic_ticket() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = make_sold_ticket(owner, TicketType::Systematic, 1000.0);
        SqliteTicketRepository::new(pool.clone())
            .import(&ticket)
            .await
            .unwrap();

        let cancelled = svc
            .cancel_by_number(&ticket.number, "changed plans", "system")
            .await
            .unwrap();
        assert_eq!(cancelled.status, TicketStatus::Cancelled);

        let refund = SqliteRefundRepository::new(pool.clone())
            .latest_for_ticket(&ticket.number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refund.amount, 800.0);
        assert_eq!(refund.status, RefundStatus::Pending);
        assert_eq!(refund.reason, "changed plans");
        assert_eq!(refund.currency, "USD");

        let history = SqliteHistoryRepository::new(pool.clone())
            .list_for_ticket(&ticket.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Cancelled);
        assert_eq!(history[0].description, "changed plans");
    }

    #[tokio::test]
    async fn test_cancel_charter_ticket() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = make_sold_ticket(owner, TicketType::Charter, 500.0);
        SqliteTicketRepository::new(pool.clone())
            .import(&ticket)
            .await
            .unwrap();

        svc.cancel_by_number(&ticket.number, "schedule conflict", "system")
            .await
            .unwrap();

        let refund = SqliteRefundRepository::new(pool.clone())
            .latest_for_ticket(&ticket.number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refund.amount, 250.0);
    }

    #[tokio::test]
    async fn test_cancel_unknown_ticket() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let err = svc
            .cancel_by_number("TKT-00000000", "whatever", "system")
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_already_cancelled_leaves_no_trace() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = make_sold_ticket(owner, TicketType::Systematic, 1000.0);
        SqliteTicketRepository::new(pool.clone())
            .import(&ticket)
            .await
            .unwrap();

        svc.cancel_by_number(&ticket.number, "first", "system")
            .await
            .unwrap();
        let err = svc
            .cancel_by_number(&ticket.number, "second", "system")
            .await
            .unwrap_err();

        match err {
            TicketError::InvalidState { current } => assert_eq!(current, "cancelled"),
            other => panic!("expected InvalidState, got {other:?}"),
        }

        // Exactly one refund request and one history entry: the failed
        // second attempt left nothing behind.
        let refunds = SqliteRefundRepository::new(pool.clone())
            .list_for_ticket(&ticket.number)
            .await
            .unwrap();
        assert_eq!(refunds.len(), 1);
        assert_eq!(refunds[0].reason, "first");

        let history = SqliteHistoryRepository::new(pool.clone())
            .list_for_ticket(&ticket.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_open_support_ticket_rejected() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        let ticket = svc
            .create_ticket(
                &owner,
                CreateTicketRequest {
                    subject: "Open ticket".to_string(),
                    description: String::new(),
                    priority: "low".to_string(),
                },
            )
            .await
            .unwrap();

        let err = svc
            .cancel_by_number(&ticket.number, "nope", "system")
            .await
            .unwrap_err();
        match err {
            TicketError::InvalidState { current } => assert_eq!(current, "open"),
            other => panic!("expected InvalidState, got {other:?}"),
        }

        let refunds = SqliteRefundRepository::new(pool.clone())
            .list_for_ticket(&ticket.number)
            .await
            .unwrap();
        assert!(refunds.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_untyped_active_ticket_fails_validation() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;
        let svc = service(&pool);

        // Active but without a fare class: the policy calculator rejects
        // it before any row is written.
        let mut ticket = make_sold_ticket(owner, TicketType::Charter, 300.0);
        ticket.ticket_type = None;
        SqliteTicketRepository::new(pool.clone())
            .import(&ticket)
            .await
            .unwrap();

        let err = svc
            .cancel_by_number(&ticket.number, "reason", "system")
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));

        let unchanged = SqliteTicketRepository::new(pool.clone())
            .get_by_number(&ticket.number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, TicketStatus::Active);
    }

    #[tokio::test]
    async fn test_concurrent_cancels_only_one_wins() {
        let pool = test_pool().await;
        let owner = setup_user(&pool).await;

        let ticket = make_sold_ticket(owner, TicketType::Systematic, 1000.0);
        SqliteTicketRepository::new(pool.clone())
            .import(&ticket)
            .await
            .unwrap();

        let svc1 = service(&pool);
        let svc2 = service(&pool);
        let number1 = ticket.number.clone();
        let number2 = ticket.number.clone();

        let (r1, r2) = tokio::join!(
            svc1.cancel_by_number(&number1, "racer one", "system"),
            svc2.cancel_by_number(&number2, "racer two", "system"),
        );

        let successes = [r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one concurrent cancel may succeed");

        let refunds = SqliteRefundRepository::new(pool.clone())
            .list_for_ticket(&ticket.number)
            .await
            .unwrap();
        assert_eq!(refunds.len(), 1);
    }
}
