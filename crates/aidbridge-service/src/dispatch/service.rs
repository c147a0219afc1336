//! Dispatch service.
//!
//! Dispatching creates one ticket and one inbox record per (need, responder)
//! pair and queues a push for each new record. Both inserts are
//! insert-if-absent, so a retried call after a partial failure fills the
//! gaps without creating duplicates.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use aidbridge_core::AppError;
use aidbridge_core::result::AppResult;
use aidbridge_core::traits::PushPayload;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};
use aidbridge_database::Store;
use aidbridge_entity::need::{Need, is_fully_closed};
use aidbridge_entity::notification::NotificationRecord;
use aidbridge_entity::ticket::HandlingTicket;

use crate::context::RequestContext;
use crate::lookup;
use crate::push::PushDispatcher;

/// Longest body excerpt sent in a push.
const PUSH_BODY_LEN: usize = 140;

/// Result of a dispatch call.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    /// The dispatched need.
    pub need_id: NeedId,
    /// Tickets created by this call.
    pub created: Vec<HandlingTicket>,
    /// Tickets that already existed for the requested responders.
    pub already_dispatched: Vec<TicketId>,
}

/// Sends a need to responders.
#[derive(Debug, Clone)]
pub struct DispatchService {
    store: Store,
    push: PushDispatcher,
}

impl DispatchService {
    /// Creates a new dispatch service.
    pub fn new(store: Store, push: PushDispatcher) -> Self {
        Self { store, push }
    }

    /// Dispatch a need to the given responders.
    ///
    /// Repeating a (need, responder) pair is a no-op for that pair. Every
    /// responder id is resolved before anything is written.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        need_id: NeedId,
        responder_ids: &[ResponderId],
    ) -> AppResult<DispatchOutcome> {
        let requester_id = ctx.require_requester()?;
        let need = lookup::need(&self.store, need_id).await?;
        if need.requester_id != requester_id {
            return Err(AppError::authorization(format!(
                "Only the requester of need {need_id} may dispatch it"
            )));
        }

        let mut seen = HashSet::new();
        let targets: Vec<ResponderId> = responder_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if targets.is_empty() {
            return Err(AppError::validation(
                "At least one responder must be selected",
            ));
        }

        let existing = self.store.tickets.find_by_need(need_id).await?;
        if is_fully_closed(existing.iter().map(|t| t.status)) {
            return Err(AppError::not_found(format!(
                "Need {need_id} is closed"
            )));
        }

        let known: HashSet<ResponderId> = self
            .store
            .responders
            .find_many(&targets)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let unknown: Vec<String> = targets
            .iter()
            .filter(|id| !known.contains(id))
            .map(ToString::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::not_found(format!(
                "Unknown responders: {}",
                unknown.join(", ")
            )));
        }

        let mut outcome = DispatchOutcome {
            need_id,
            created: Vec::new(),
            already_dispatched: Vec::new(),
        };

        for responder_id in targets {
            let (ticket, created) = self.ensure_ticket(need_id, responder_id).await?;
            let record = NotificationRecord::new(need_id, responder_id, ticket.id, need.emergency);
            let notified = self.store.notifications.insert_if_absent(&record).await?;

            if notified {
                let queued = self.push.enqueue(push_payload(&need, &ticket));
                debug!(
                    ticket_id = %ticket.id,
                    responder_id = %responder_id,
                    queued,
                    "Push requested"
                );
            }

            if created {
                outcome.created.push(ticket);
            } else {
                outcome.already_dispatched.push(ticket.id);
            }
        }

        info!(
            need_id = %need_id,
            requester_id = %requester_id,
            created = outcome.created.len(),
            already_dispatched = outcome.already_dispatched.len(),
            emergency = need.emergency,
            "Need dispatched"
        );

        Ok(outcome)
    }

    async fn ensure_ticket(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<(HandlingTicket, bool)> {
        let ticket = HandlingTicket::new(need_id, responder_id);
        if self.store.tickets.insert_if_absent(&ticket).await? {
            return Ok((ticket, true));
        }
        let existing = self
            .store
            .tickets
            .find_by_pair(need_id, responder_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Ticket for need {need_id} and responder {responder_id} vanished"
                ))
            })?;
        Ok((existing, false))
    }
}

fn push_payload(need: &Need, ticket: &HandlingTicket) -> PushPayload {
    let title = match (need.emergency, need.is_donation()) {
        (true, _) => format!("Emergency: {}", need.category),
        (false, true) => format!("Donation offer: {}", need.category),
        (false, false) => format!("New request: {}", need.category),
    };
    let body: String = need.description.chars().take(PUSH_BODY_LEN).collect();

    PushPayload {
        responder_id: ticket.responder_id,
        need_id: need.id,
        ticket_id: ticket.id,
        title,
        body,
        emergency: need.emergency,
    }
}
