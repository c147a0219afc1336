//! Responder-side ticket transitions.

use serde::Serialize;
use tracing::{info, warn};

use aidbridge_core::AppError;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::TicketId;
use aidbridge_database::Store;
use aidbridge_entity::ledger::ActorType;
use aidbridge_entity::pickup::PickupEvent;
use aidbridge_entity::ticket::{HandlingTicket, TicketStatus};

use super::workflow::TicketWorkflow;
use crate::context::RequestContext;
use crate::lookup;
use crate::scoring::ScoringEngine;

/// A ticket together with its pickup, if one was booked.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    /// The ticket.
    pub ticket: HandlingTicket,
    /// Pickup for donation tickets once scheduled.
    pub pickup: Option<PickupEvent>,
}

/// Accept, reject and complete tickets.
#[derive(Debug, Clone)]
pub struct TicketService {
    workflow: TicketWorkflow,
    scoring: ScoringEngine,
}

impl TicketService {
    /// Creates a new ticket service.
    pub fn new(store: Store, scoring: ScoringEngine) -> Self {
        Self {
            workflow: TicketWorkflow::new(store),
            scoring,
        }
    }

    /// Fetch a ticket. Visible to its responder and to the need's requester.
    pub async fn get_ticket(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<TicketView> {
        let store = self.workflow.store();
        let ticket = lookup::ticket(store, ticket_id).await?;
        if !ctx.is_responder(ticket.responder_id) {
            let need = lookup::need(store, ticket.need_id).await?;
            if !ctx.is_requester(need.requester_id) {
                return Err(AppError::authorization(format!(
                    "Not entitled to view ticket {ticket_id}"
                )));
            }
        }
        let pickup = store.pickups.find_by_ticket(ticket_id).await?;
        Ok(TicketView { ticket, pickup })
    }

    /// `pending → accepted`.
    pub async fn accept(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<HandlingTicket> {
        let ticket = self.workflow.for_responder(ctx, ticket_id).await?;
        self.workflow.apply(ticket, |t| t.accept()).await
    }

    /// `pending → rejected`.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<HandlingTicket> {
        let ticket = self.workflow.for_responder(ctx, ticket_id).await?;
        self.workflow.apply(ticket, |t| t.reject()).await
    }

    /// `scheduled → completed`, once the requester has confirmed the handoff.
    /// Credits the responder on success.
    ///
    /// Calling it again on a completed ticket whose credit never reached the
    /// ledger appends the missing credit instead of failing.
    pub async fn mark_completed(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<HandlingTicket> {
        let ticket = self.workflow.for_responder(ctx, ticket_id).await?;
        if ticket.status == TicketStatus::Completed
            && !self
                .scoring
                .is_credited(ticket.id, ActorType::Responder)
                .await?
        {
            let score = self
                .scoring
                .credit_completion(ticket.responder_id, ticket.id)
                .await?;
            warn!(
                ticket_id = %ticket.id,
                responder_id = %ticket.responder_id,
                points = score.points,
                "Missing completion credit appended"
            );
            return Ok(ticket);
        }

        let completed = self.workflow.apply(ticket, |t| t.complete()).await?;

        let score = self
            .scoring
            .credit_completion(completed.responder_id, completed.id)
            .await?;

        info!(
            ticket_id = %completed.id,
            responder_id = %completed.responder_id,
            points = score.points,
            "Responder credited for completion"
        );

        Ok(completed)
    }
}
