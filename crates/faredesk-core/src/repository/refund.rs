//! Refund request repository trait definition.

use chrono::{DateTime, Utc};
use faredesk_types::error::RepositoryError;
use faredesk_types::refund::{RefundRequest, RefundStatus};

/// Repository trait for refund request persistence.
///
/// Rows are inserted by `TicketRepository::cancel` (inside the
/// cancellation transaction); this trait covers reads and resolution.
pub trait RefundRepository: Send + Sync {
    /// The operative refund request for a ticket number: the most
    /// recently created one. Older requests remain as history.
    fn latest_for_ticket(
        &self,
        ticket_number: &str,
    ) -> impl std::future::Future<Output = Result<Option<RefundRequest>, RepositoryError>> + Send;

    /// All refund requests for a ticket number, newest first.
    fn list_for_ticket(
        &self,
        ticket_number: &str,
    ) -> impl std::future::Future<Output = Result<Vec<RefundRequest>, RepositoryError>> + Send;

    /// Resolve the latest refund request for a ticket atomically: set
    /// its status/processed_by/processed_at and mirror the status onto
    /// the ticket row (`refund_status`, plus `refund_processed_at` when
    /// the new status is `processed`) in one transaction.
    ///
    /// Fails with `RepositoryError::NotFound` when the ticket has no
    /// refund request; nothing changes in that case. Returns the updated
    /// request.
    fn resolve(
        &self,
        ticket_number: &str,
        status: RefundStatus,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<RefundRequest, RepositoryError>> + Send;
}
