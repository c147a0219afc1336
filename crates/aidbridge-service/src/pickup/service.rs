//! Responder-side progression of donation pickups.
//!
//! Pickup progress is tracked on its own record and never moves the ticket.

use tracing::info;

use aidbridge_core::AppError;
use aidbridge_core::error::ErrorKind;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::TicketId;
use aidbridge_database::Store;
use aidbridge_entity::pickup::PickupEvent;

use crate::context::RequestContext;
use crate::lookup;

/// Drives a PickupEvent from scheduled to a terminal state.
#[derive(Debug, Clone)]
pub struct PickupService {
    store: Store,
}

impl PickupService {
    /// Creates a new pickup service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Fetch the pickup of a ticket. Visible to its responder and requester.
    pub async fn get_pickup(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<PickupEvent> {
        let ticket = lookup::ticket(&self.store, ticket_id).await?;
        if !ctx.is_responder(ticket.responder_id) {
            let need = lookup::need(&self.store, ticket.need_id).await?;
            if !ctx.is_requester(need.requester_id) {
                return Err(AppError::authorization(format!(
                    "Not entitled to view the pickup of ticket {ticket_id}"
                )));
            }
        }
        self.find(ticket_id).await
    }

    /// Items collected: `scheduled → in_progress`.
    pub async fn start_pickup(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<PickupEvent> {
        self.progress(ctx, ticket_id, |p| p.start()).await
    }

    /// Items delivered: `in_progress → completed`.
    pub async fn complete_delivery(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
        proof_images: Vec<String>,
        notes: Option<String>,
    ) -> AppResult<PickupEvent> {
        self.progress(ctx, ticket_id, |p| {
            p.complete(proof_images.clone(), notes.clone())
        })
        .await
    }

    /// Pickup could not be carried out.
    pub async fn fail_pickup(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
        notes: Option<String>,
    ) -> AppResult<PickupEvent> {
        self.progress(ctx, ticket_id, |p| p.fail(notes.clone())).await
    }

    /// Called off before collection.
    pub async fn cancel_pickup(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<PickupEvent> {
        self.progress(ctx, ticket_id, |p| p.cancel()).await
    }

    async fn find(&self, ticket_id: TicketId) -> AppResult<PickupEvent> {
        self.store
            .pickups
            .find_by_ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No pickup booked for ticket {ticket_id}")))
    }

    async fn progress<F>(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
        mut op: F,
    ) -> AppResult<PickupEvent>
    where
        F: FnMut(&mut PickupEvent) -> AppResult<()> + Send,
    {
        let responder_id = ctx.require_responder()?;
        let ticket = lookup::ticket(&self.store, ticket_id).await?;
        if ticket.responder_id != responder_id {
            return Err(AppError::authorization(format!(
                "Ticket {ticket_id} belongs to another responder"
            )));
        }

        let mut event = self.find(ticket_id).await?;
        let from = event.status;
        op(&mut event)?;

        let saved = match self.store.pickups.update(&event).await {
            Ok(saved) => saved,
            Err(e) if e.is(ErrorKind::Conflict) => {
                let mut fresh = self.find(ticket_id).await?;
                op(&mut fresh)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        info!(
            pickup_id = %saved.id,
            ticket_id = %ticket_id,
            responder_id = %responder_id,
            from = %from,
            to = %saved.status,
            "Pickup progressed"
        );

        Ok(saved)
    }
}
