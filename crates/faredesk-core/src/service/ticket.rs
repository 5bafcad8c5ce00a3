//! Ticket lifecycle engine.
//!
//! Orchestrates ticket creation, status updates, cancellation, and
//! refund resolution. This service exclusively owns transitions of
//! `Ticket.status` and `RefundRequest.status`; no other component
//! mutates those fields.
//!
//! Cancellation and refund resolution are multi-row writes with money
//! attached; both run inside a single storage transaction (owned by the
//! repository implementation) so partial state is never observable.

use faredesk_types::error::{RepositoryError, TicketError};
use faredesk_types::history::{HistoryAction, TicketHistoryEntry};
use faredesk_types::refund::{RefundRequest, RefundStatus};
use faredesk_types::ticket::{
    generate_ticket_number, CreateTicketRequest, Ticket, TicketId, TicketPriority, TicketStatus,
};
use faredesk_types::user::UserId;

use crate::repository::history::HistoryRepository;
use crate::repository::refund::RefundRepository;
use crate::repository::ticket::TicketRepository;
use crate::service::policy;

/// Service enforcing valid state transitions and atomic multi-record
/// updates on tickets and their refund requests.
///
/// Generic over repository traits to maintain clean architecture --
/// faredesk-core never depends on faredesk-infra.
pub struct TicketService<T: TicketRepository, R: RefundRepository, H: HistoryRepository> {
    ticket_repo: T,
    refund_repo: R,
    history_repo: H,
    /// Currency assigned to support tickets created through this service.
    default_currency: String,
}

impl<T: TicketRepository, R: RefundRepository, H: HistoryRepository> TicketService<T, R, H> {
    /// Create a new TicketService.
    pub fn new(ticket_repo: T, refund_repo: R, history_repo: H, default_currency: String) -> Self {
        Self {
            ticket_repo,
            refund_repo,
            history_repo,
            default_currency,
        }
    }

    /// Create a support ticket: generated unique number, status `open`,
    /// one `created` history entry.
    pub async fn create_ticket(
        &self,
        owner: &UserId,
        request: CreateTicketRequest,
    ) -> Result<Ticket, TicketError> {
        let subject = request.subject.trim().to_string();
        if subject.is_empty() {
            return Err(TicketError::Validation(
                "subject cannot be empty".to_string(),
            ));
        }

        let priority: TicketPriority = request
            .priority
            .parse()
            .map_err(TicketError::Validation)?;

        let now = chrono::Utc::now();
        let ticket = Ticket {
            id: TicketId::new(),
            owner_id: *owner,
            number: generate_ticket_number(),
            status: TicketStatus::Open,
            subject,
            description: request.description,
            priority,
            ticket_type: None,
            price: 0.0,
            currency: self.default_currency.clone(),
            refund_status: None,
            refund_amount: None,
            refund_processed_at: None,
            created_at: now,
            updated_at: now,
        };

        let history = TicketHistoryEntry::new(
            ticket.id,
            HistoryAction::Created,
            "Ticket created",
            &owner.to_string(),
        );

        let created = self
            .ticket_repo
            .create(&ticket, &history)
            .await
            .map_err(map_storage)?;

        tracing::info!(number = %created.number, "ticket created");
        Ok(created)
    }

    /// List tickets belonging to an owner.
    pub async fn list_tickets(&self, owner: &UserId) -> Result<Vec<Ticket>, TicketError> {
        self.ticket_repo
            .list_for_owner(owner)
            .await
            .map_err(map_storage)
    }

    /// Get a ticket by ID, scoped to its owner.
    pub async fn get_ticket(&self, id: &TicketId, owner: &UserId) -> Result<Ticket, TicketError> {
        let ticket = self
            .ticket_repo
            .get_by_id(id)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| TicketError::NotFound(format!("ticket {id}")))?;

        if ticket.owner_id != *owner {
            return Err(TicketError::NotFound(format!("ticket {id}")));
        }

        Ok(ticket)
    }

    /// Update a ticket's status through the generic support flow.
    ///
    /// Only {open, in_progress, resolved, closed} may be set here;
    /// `active` belongs to the booking pipeline and `cancelled` to
    /// [`Self::cancel_by_number`]. Last-write-wins: this path never
    /// touches money, so it does not take the cancellation transaction.
    pub async fn update_status(
        &self,
        id: &TicketId,
        owner: &UserId,
        new_status: TicketStatus,
        description: &str,
    ) -> Result<Ticket, TicketError> {
        if !new_status.is_settable() {
            return Err(TicketError::Validation(format!(
                "status '{new_status}' cannot be set directly"
            )));
        }

        let mut ticket = self.get_ticket(id, owner).await?;

        self.ticket_repo
            .set_status(id, new_status)
            .await
            .map_err(map_storage)?;

        let history = TicketHistoryEntry::new(
            ticket.id,
            HistoryAction::StatusUpdated,
            description,
            &owner.to_string(),
        );
        self.history_repo
            .append(&history)
            .await
            .map_err(map_storage)?;

        ticket.status = new_status;
        ticket.updated_at = chrono::Utc::now();
        Ok(ticket)
    }

    /// The audit trail for a ticket, oldest entry first.
    pub async fn get_history(
        &self,
        id: &TicketId,
        owner: &UserId,
    ) -> Result<Vec<TicketHistoryEntry>, TicketError> {
        let ticket = self.get_ticket(id, owner).await?;
        self.history_repo
            .list_for_ticket(&ticket.id)
            .await
            .map_err(map_storage)
    }

    /// Cancel a sold ticket and open its refund request, atomically.
    ///
    /// Steps: look up by number; verify status is `active`; compute the
    /// refund via the policy calculator; then in one transaction insert
    /// the pending refund request, flip the ticket to `cancelled`, and
    /// append the history entry. The guard is re-checked inside the
    /// transaction, so of two concurrent cancellations exactly one
    /// succeeds; the other fails with `InvalidState` and leaves nothing
    /// behind.
    pub async fn cancel_by_number(
        &self,
        number: &str,
        reason: &str,
        requested_by: &str,
    ) -> Result<Ticket, TicketError> {
        let ticket = self
            .ticket_repo
            .get_by_number(number)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| TicketError::NotFound(format!("ticket {number}")))?;

        if ticket.status != TicketStatus::Active {
            return Err(TicketError::InvalidState {
                current: ticket.status.to_string(),
            });
        }

        let amount = policy::refund_amount(&ticket)?;

        // Currency comes from the ticket record, not a constant.
        let refund = RefundRequest::pending(number, requested_by, reason, amount, &ticket.currency);
        let history =
            TicketHistoryEntry::new(ticket.id, HistoryAction::Cancelled, reason, requested_by);

        let cancelled = self
            .ticket_repo
            .cancel(number, &refund, &history)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => TicketError::NotFound(format!("ticket {number}")),
                RepositoryError::InvalidState(current) => TicketError::InvalidState { current },
                other => map_storage(other),
            })?;

        tracing::info!(number, amount, "ticket cancelled, refund request opened");
        Ok(cancelled)
    }

    /// The operative refund request for a ticket number: the most
    /// recently created one.
    pub async fn refund_status_by_number(
        &self,
        number: &str,
    ) -> Result<RefundRequest, TicketError> {
        self.refund_repo
            .latest_for_ticket(number)
            .await
            .map_err(map_storage)?
            .ok_or_else(|| TicketError::NotFound(format!("refund request for ticket {number}")))
    }

    /// Resolve the latest refund request for a ticket, atomically
    /// mirroring the new status onto the ticket row.
    ///
    /// After success the request's status and the ticket's refund_status
    /// are equal; after failure neither has changed.
    pub async fn update_refund_status_by_number(
        &self,
        number: &str,
        status: RefundStatus,
        processed_by: &str,
    ) -> Result<RefundRequest, TicketError> {
        let now = chrono::Utc::now();

        let updated = self
            .refund_repo
            .resolve(number, status, processed_by, now)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => {
                    TicketError::NotFound(format!("refund request for ticket {number}"))
                }
                other => map_storage(other),
            })?;

        tracing::info!(number, status = %status, processed_by, "refund request resolved");
        Ok(updated)
    }
}

fn map_storage(e: RepositoryError) -> TicketError {
    TicketError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ticket_request_priority_parses() {
        let req = CreateTicketRequest {
            subject: "Lost booking".to_string(),
            description: "Cannot find my booking".to_string(),
            priority: "high".to_string(),
        };
        let priority: TicketPriority = req.priority.parse().unwrap();
        assert_eq!(priority, TicketPriority::High);
    }

    #[test]
    fn test_invalid_priority_message() {
        let err = "urgent".parse::<TicketPriority>().unwrap_err();
        assert!(err.contains("invalid ticket priority"));
    }
}
