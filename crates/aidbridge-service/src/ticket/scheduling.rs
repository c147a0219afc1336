//! Scheduling sub-workflow.
//!
//! Layered on the ticket's `schedule` and `reschedule` transitions. For
//! donation offers it also books (or moves) the PickupEvent that tracks the
//! physical collection.

use serde::Serialize;
use tracing::info;

use aidbridge_core::AppError;
use aidbridge_core::error::ErrorKind;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::TicketId;
use aidbridge_database::Store;
use aidbridge_entity::need::Need;
use aidbridge_entity::pickup::{PickupEvent, PickupStatus};
use aidbridge_entity::ticket::{HandlingTicket, ScheduleRequest, SchedulingDetail};

use super::workflow::TicketWorkflow;
use crate::context::RequestContext;
use crate::lookup;

/// A scheduled ticket and, for donations, its pickup.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledTicket {
    /// The ticket.
    pub ticket: HandlingTicket,
    /// Pickup booked for a donation offer.
    pub pickup: Option<PickupEvent>,
}

/// Books and moves volunteer slots.
#[derive(Debug, Clone)]
pub struct SchedulingService {
    workflow: TicketWorkflow,
}

impl SchedulingService {
    /// Creates a new scheduling service.
    pub fn new(store: Store) -> Self {
        Self {
            workflow: TicketWorkflow::new(store),
        }
    }

    /// `accepted → scheduled` with a validated volunteer slot.
    pub async fn schedule(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
        request: &ScheduleRequest,
    ) -> AppResult<ScheduledTicket> {
        let ticket = self.workflow.for_responder(ctx, ticket_id).await?;
        let detail = request.validate()?;
        let need = lookup::need(self.workflow.store(), ticket.need_id).await?;

        let scheduled = self
            .workflow
            .apply(ticket, |t| t.schedule(detail.clone()))
            .await?;

        let pickup = if need.is_donation() {
            Some(self.book_pickup(&need, &scheduled, &detail).await?)
        } else {
            None
        };

        Ok(ScheduledTicket {
            ticket: scheduled,
            pickup,
        })
    }

    /// Replace the slot of a scheduled, not yet confirmed ticket.
    pub async fn reschedule(
        &self,
        ctx: &RequestContext,
        ticket_id: TicketId,
        request: &ScheduleRequest,
    ) -> AppResult<ScheduledTicket> {
        let ticket = self.workflow.for_responder(ctx, ticket_id).await?;
        let detail = request.validate()?;
        let need = lookup::need(self.workflow.store(), ticket.need_id).await?;

        if need.is_donation() {
            let store = self.workflow.store();
            let existing = store.pickups.find_by_ticket(ticket_id).await?;
            if let Some(pickup) = existing.filter(|p| p.status != PickupStatus::Scheduled) {
                return Err(AppError::invalid_transition(format!(
                    "Pickup for ticket {ticket_id} is already {}",
                    pickup.status
                )));
            }
        }

        let rescheduled = self
            .workflow
            .apply(ticket, |t| t.reschedule(detail.clone()))
            .await?;

        info!(
            ticket_id = %rescheduled.id,
            responder_id = %rescheduled.responder_id,
            scheduled_at = %detail.scheduled_at(),
            "Ticket rescheduled"
        );

        let pickup = if need.is_donation() {
            Some(self.move_pickup(&need, &rescheduled, &detail).await?)
        } else {
            None
        };

        Ok(ScheduledTicket {
            ticket: rescheduled,
            pickup,
        })
    }

    async fn book_pickup(
        &self,
        need: &Need,
        ticket: &HandlingTicket,
        detail: &SchedulingDetail,
    ) -> AppResult<PickupEvent> {
        let store = self.workflow.store();
        let drop_location = match need.drop_location {
            Some(point) => point,
            None => lookup::responder(store, ticket.responder_id).await?.location,
        };
        let event = PickupEvent::new(
            ticket.id,
            need.location,
            drop_location,
            detail.scheduled_at(),
        );

        if !store.pickups.insert_if_absent(&event).await? {
            return store.pickups.find_by_ticket(ticket.id).await?.ok_or_else(|| {
                AppError::internal(format!("Pickup for ticket {} vanished", ticket.id))
            });
        }

        info!(
            pickup_id = %event.id,
            ticket_id = %ticket.id,
            scheduled_at = %event.scheduled_at,
            "Pickup booked"
        );
        Ok(event)
    }

    async fn move_pickup(
        &self,
        need: &Need,
        ticket: &HandlingTicket,
        detail: &SchedulingDetail,
    ) -> AppResult<PickupEvent> {
        let store = self.workflow.store();
        let Some(mut event) = store.pickups.find_by_ticket(ticket.id).await? else {
            return self.book_pickup(need, ticket, detail).await;
        };

        event.reschedule(detail.scheduled_at())?;
        match store.pickups.update(&event).await {
            Ok(saved) => Ok(saved),
            Err(e) if e.is(ErrorKind::Conflict) => Err(AppError::conflict(format!(
                "Pickup for ticket {} changed while rescheduling",
                ticket.id
            ))),
            Err(e) => Err(e),
        }
    }
}
