//! SQLite refund request repository implementation.
//!
//! Rows are inserted by the cancellation transaction in
//! `SqliteTicketRepository::cancel`; this module reads them and resolves
//! them. Resolution updates the refund request and the ticket's mirrored
//! refund fields in one transaction, so the two are never observed out
//! of sync.

use chrono::{DateTime, Utc};
use faredesk_core::repository::refund::RefundRepository;
use faredesk_types::error::RepositoryError;
use faredesk_types::refund::{RefundRequest, RefundStatus};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `RefundRepository`.
pub struct SqliteRefundRepository {
    pool: DatabasePool,
}

impl SqliteRefundRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to the domain RefundRequest.
struct RefundRow {
    id: String,
    ticket_number: String,
    requested_by: String,
    reason: String,
    status: String,
    amount: f64,
    currency: String,
    processed_by: Option<String>,
    processed_at: Option<String>,
    notes: Option<String>,
    created_at: String,
}

impl RefundRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            ticket_number: row.try_get("ticket_number")?,
            requested_by: row.try_get("requested_by")?,
            reason: row.try_get("reason")?,
            status: row.try_get("status")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            processed_by: row.try_get("processed_by")?,
            processed_at: row.try_get("processed_at")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_refund(self) -> Result<RefundRequest, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid refund id: {e}")))?;

        let status: RefundStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let processed_at = self
            .processed_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(RefundRequest {
            id,
            ticket_number: self.ticket_number,
            requested_by: self.requested_by,
            reason: self.reason,
            status,
            amount: self.amount,
            currency: self.currency,
            processed_by: self.processed_by,
            processed_at,
            notes: self.notes,
            created_at,
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

/// Latest request first. The id tiebreak keeps ordering deterministic
/// when two requests share a creation timestamp (UUID v7 is
/// time-sortable).
const LATEST_FOR_TICKET: &str =
    "SELECT * FROM refund_requests WHERE ticket_number = ? ORDER BY created_at DESC, id DESC";

impl RefundRepository for SqliteRefundRepository {
    async fn latest_for_ticket(
        &self,
        ticket_number: &str,
    ) -> Result<Option<RefundRequest>, RepositoryError> {
        let sql = format!("{LATEST_FOR_TICKET} LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(ticket_number)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let refund_row =
                    RefundRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(refund_row.into_refund()?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_ticket(
        &self,
        ticket_number: &str,
    ) -> Result<Vec<RefundRequest>, RepositoryError> {
        let rows = sqlx::query(LATEST_FOR_TICKET)
            .bind(ticket_number)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut refunds = Vec::with_capacity(rows.len());
        for row in &rows {
            let refund_row =
                RefundRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            refunds.push(refund_row.into_refund()?);
        }

        Ok(refunds)
    }

    async fn resolve(
        &self,
        ticket_number: &str,
        status: RefundStatus,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<RefundRequest, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Fetch the operative request inside the transaction.
        let sql = format!("{LATEST_FOR_TICKET} LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(ticket_number)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        let refund_row =
            RefundRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        let mut refund = refund_row.into_refund()?;

        sqlx::query(
            "UPDATE refund_requests SET status = ?, processed_by = ?, processed_at = ? WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(processed_by)
        .bind(format_datetime(&processed_at))
        .bind(refund.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Mirror the status onto the ticket row.
        let result = if status == RefundStatus::Processed {
            sqlx::query(
                "UPDATE tickets SET refund_status = ?, refund_processed_at = ?, updated_at = ? WHERE number = ?",
            )
            .bind(status.to_string())
            .bind(format_datetime(&processed_at))
            .bind(format_datetime(&processed_at))
            .bind(ticket_number)
            .execute(&mut *tx)
            .await
        } else {
            sqlx::query("UPDATE tickets SET refund_status = ?, updated_at = ? WHERE number = ?")
                .bind(status.to_string())
                .bind(format_datetime(&processed_at))
                .bind(ticket_number)
                .execute(&mut *tx)
                .await
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            // A refund request without its ticket is corrupt data; roll
            // everything back rather than leave the pair out of sync.
            return Err(RepositoryError::Query(format!(
                "ticket '{ticket_number}' missing for refund mirror update"
            )));
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        refund.status = status;
        refund.processed_by = Some(processed_by.to_string());
        refund.processed_at = Some(processed_at);
        Ok(refund)
    }
}
