//! Requester confirmation and feedback.

use tracing::{info, warn};

use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::TicketId;
use aidbridge_database::Store;
use aidbridge_entity::ledger::ActorType;
use aidbridge_entity::ticket::HandlingTicket;

use super::workflow::TicketWorkflow;
use crate::context::RequestContext;
use crate::scoring::ScoringEngine;

/// Operations reserved to the need's original requester.
#[derive(Debug, Clone)]
pub struct ConfirmationService {
    workflow: TicketWorkflow,
    scoring: ScoringEngine,
}

impl ConfirmationService {
    /// Creates a new confirmation service.
    pub fn new(store: Store, scoring: ScoringEngine) -> Self {
        Self {
            workflow: TicketWorkflow::new(store),
            scoring,
        }
    }

    /// Acknowledge the physical handoff on a scheduled ticket.
    pub async fn confirm_pickup(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
    ) -> AppResult<HandlingTicket> {
        let (ticket, need) = self.workflow.for_requester(ctx, ticket_id).await?;
        let confirmed = self.workflow.apply(ticket, |t| t.confirm_pickup()).await?;

        info!(
            ticket_id = %confirmed.id,
            need_id = %need.id,
            requester_id = %need.requester_id,
            "Pickup confirmed by requester"
        );

        Ok(confirmed)
    }

    /// Leave the one-time rating on a completed ticket and credit the requester.
    ///
    /// If the rating is already recorded but its credit never reached the
    /// ledger, the credit is appended and the stored rating is kept.
    pub async fn submit_feedback(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
        rating: i64,
        comment: Option<String>,
    ) -> AppResult<HandlingTicket> {
        let (ticket, need) = self.workflow.for_requester(ctx, ticket_id).await?;
        if ticket.feedback.is_some()
            && !self
                .scoring
                .is_credited(ticket.id, ActorType::Requester)
                .await?
        {
            let score = self
                .scoring
                .credit_feedback(need.requester_id, ticket.id)
                .await?;
            warn!(
                ticket_id = %ticket.id,
                requester_id = %need.requester_id,
                points = score.points,
                "Missing feedback credit appended"
            );
            return Ok(ticket);
        }

        let rated = self
            .workflow
            .apply(ticket, |t| t.record_feedback(rating, comment.clone()).map(|_| ()))
            .await?;

        let score = self
            .scoring
            .credit_feedback(need.requester_id, rated.id)
            .await?;

        info!(
            ticket_id = %rated.id,
            requester_id = %need.requester_id,
            rating,
            points = score.points,
            "Feedback recorded"
        );

        Ok(rated)
    }
}
