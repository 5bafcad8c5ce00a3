//! Ticket repository trait definition.

use faredesk_types::error::RepositoryError;
use faredesk_types::history::TicketHistoryEntry;
use faredesk_types::refund::RefundRequest;
use faredesk_types::ticket::{Ticket, TicketId, TicketStatus};
use faredesk_types::user::UserId;

/// Repository trait for ticket persistence.
///
/// Implementations live in faredesk-infra (e.g., `SqliteTicketRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition, no
/// async_trait macro).
///
/// `create` and `cancel` are transactional compound operations: the
/// implementation commits every row they touch or none of them.
pub trait TicketRepository: Send + Sync {
    /// Create a support ticket together with its `created` history entry,
    /// atomically. Returns the created ticket.
    fn create(
        &self,
        ticket: &Ticket,
        history: &TicketHistoryEntry,
    ) -> impl std::future::Future<Output = Result<Ticket, RepositoryError>> + Send;

    /// Insert a sold ticket as-is. This is the booking pipeline's entry
    /// point; no history entry is written.
    fn import(
        &self,
        ticket: &Ticket,
    ) -> impl std::future::Future<Output = Result<Ticket, RepositoryError>> + Send;

    /// Get a ticket by its internal ID.
    fn get_by_id(
        &self,
        id: &TicketId,
    ) -> impl std::future::Future<Output = Result<Option<Ticket>, RepositoryError>> + Send;

    /// Get a ticket by its human-facing number.
    fn get_by_number(
        &self,
        number: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ticket>, RepositoryError>> + Send;

    /// List tickets belonging to an owner, newest first.
    fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Ticket>, RepositoryError>> + Send;

    /// Persist a new status for a ticket. Plain single-row update; the
    /// caller appends the history entry separately (this path never
    /// touches money).
    fn set_status(
        &self,
        id: &TicketId,
        status: TicketStatus,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Cancel a ticket atomically: flip status `active -> cancelled`,
    /// insert the refund request, and append the history entry in one
    /// transaction.
    ///
    /// The active-status guard is re-checked inside the transaction;
    /// when another writer got there first the whole operation rolls
    /// back with `RepositoryError::InvalidState` carrying the status
    /// that was observed. Returns the cancelled ticket.
    fn cancel(
        &self,
        number: &str,
        refund: &RefundRequest,
        history: &TicketHistoryEntry,
    ) -> impl std::future::Future<Output = Result<Ticket, RepositoryError>> + Send;
}
