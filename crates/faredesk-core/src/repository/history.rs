//! Ticket history repository trait definition.
//!
//! The history log is append-only: the trait deliberately has no update
//! or delete method, and none exists on the implementation either.

use faredesk_types::error::RepositoryError;
use faredesk_types::history::TicketHistoryEntry;
use faredesk_types::ticket::TicketId;

/// Repository trait for the append-only ticket audit trail.
pub trait HistoryRepository: Send + Sync {
    /// Append one entry. Write-once.
    fn append(
        &self,
        entry: &TicketHistoryEntry,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All entries for a ticket, ordered by creation time ascending.
    fn list_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> impl std::future::Future<Output = Result<Vec<TicketHistoryEntry>, RepositoryError>> + Send;
}
