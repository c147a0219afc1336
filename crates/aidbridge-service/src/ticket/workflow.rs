//! Shared read-modify-write path for ticket transitions.

use tracing::{error, info};

use aidbridge_core::AppError;
use aidbridge_core::error::ErrorKind;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::TicketId;
use aidbridge_database::Store;
use aidbridge_entity::need::Need;
use aidbridge_entity::notification::NotificationRecord;
use aidbridge_entity::ticket::HandlingTicket;

use crate::context::RequestContext;
use crate::lookup;

#[derive(Debug, Clone)]
pub(crate) struct TicketWorkflow {
    store: Store,
}

impl TicketWorkflow {
    pub(crate) fn new(store: Store) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    /// Load a ticket owned by the calling responder.
    pub(crate) async fn for_responder(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<HandlingTicket> {
        let responder_id = ctx.require_responder()?;
        let ticket = lookup::ticket(&self.store, ticket_id).await?;
        if ticket.responder_id != responder_id {
            return Err(AppError::authorization(format!(
                "Ticket {ticket_id} belongs to another responder"
            )));
        }
        Ok(ticket)
    }

    /// Load a ticket whose need was raised by the calling requester.
    pub(crate) async fn for_requester(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<(HandlingTicket, Need)> {
        let requester_id = ctx.require_requester()?;
        let ticket = lookup::ticket(&self.store, ticket_id).await?;
        let need = lookup::need(&self.store, ticket.need_id).await?;
        if need.requester_id != requester_id {
            return Err(AppError::authorization(format!(
                "Only the requester of need {} may act on ticket {ticket_id}",
                need.id
            )));
        }
        Ok((ticket, need))
    }

    /// Apply `op` to `ticket` and write it back with compare-and-swap.
    ///
    /// When another writer got there first, `op` is re-checked against the
    /// fresh record so that a caller racing a transition sees the typed
    /// workflow error it would have seen a moment later. Only if the fresh
    /// record still admits `op` is the write reported as a conflict.
    pub(crate) async fn apply<F>(
        &self,
        ticket: HandlingTicket,
        mut op: F,
    ) -> AppResult<HandlingTicket>
    where
        F: FnMut(&mut HandlingTicket) -> AppResult<()> + Send,
    {
        let from = ticket.status;
        let mut next = ticket;
        op(&mut next)?;

        let saved = match self.store.tickets.update(&next).await {
            Ok(saved) => saved,
            Err(e) if e.is(ErrorKind::Conflict) => {
                let mut fresh = lookup::ticket(&self.store, next.id).await?;
                op(&mut fresh)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if saved.status != from {
            info!(
                ticket_id = %saved.id,
                need_id = %saved.need_id,
                responder_id = %saved.responder_id,
                from = %from,
                to = %saved.status,
                "Ticket transitioned"
            );
            self.mirror(&saved).await;
        }

        Ok(saved)
    }

    /// Rewrite the inbox status mirror for a ticket.
    ///
    /// The ticket is authoritative, so a failed mirror write is logged and
    /// does not undo the transition.
    async fn mirror(&self, ticket: &HandlingTicket) {
        let result = match self
            .store
            .notifications
            .set_status(ticket.need_id, ticket.responder_id, ticket.status.into())
            .await
        {
            Err(e) if e.is(ErrorKind::NotFound) => self.restore_record(ticket).await,
            other => other,
        };

        if let Err(e) = result {
            error!(
                ticket_id = %ticket.id,
                need_id = %ticket.need_id,
                responder_id = %ticket.responder_id,
                error = %e,
                "Failed to update inbox status mirror"
            );
        }
    }

    async fn restore_record(&self, ticket: &HandlingTicket) -> AppResult<()> {
        let need = lookup::need(&self.store, ticket.need_id).await?;
        let mut record =
            NotificationRecord::new(need.id, ticket.responder_id, ticket.id, need.emergency);
        record.mirror(ticket.status);
        self.store.notifications.insert_if_absent(&record).await?;
        Ok(())
    }
}
