//! Handling ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidbridge_core::AppError;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};

use super::feedback::Feedback;
use super::scheduling::SchedulingDetail;
use super::status::TicketStatus;

/// One responder's unit of work against a need or offer.
///
/// Exactly one ticket exists per (need, responder) pair. The mutating
/// methods below enforce the per-record rules; authorization and
/// persistence are the service layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingTicket {
    /// Unique ticket identifier.
    pub id: TicketId,
    /// The need or offer this ticket handles.
    pub need_id: NeedId,
    /// The owning responder.
    pub responder_id: ResponderId,
    /// Current workflow status.
    pub status: TicketStatus,
    /// Volunteer and slot, present once scheduled.
    pub scheduling: Option<SchedulingDetail>,
    /// Whether the requester has acknowledged the physical handoff.
    pub requester_confirmed: bool,
    /// When the requester confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Requester feedback, recorded at most once after completion.
    pub feedback: Option<Feedback>,
    /// Optimistic concurrency version; bumped by the store on every write.
    pub version: i64,
    /// When the ticket was dispatched.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last updated.
    pub updated_at: DateTime<Utc>,
}

impl HandlingTicket {
    /// Create a new pending ticket.
    pub fn new(need_id: NeedId, responder_id: ResponderId) -> Self {
        let now = Utc::now();
        Self {
            id: TicketId::new(),
            need_id,
            responder_id,
            status: TicketStatus::Pending,
            scheduling: None,
            requester_confirmed: false,
            confirmed_at: None,
            feedback: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, failing if the edge is not in the transition table.
    pub fn transition(&mut self, next: TicketStatus) -> Result<(), AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::invalid_transition(format!(
                "Ticket {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Responder accepts the need.
    pub fn accept(&mut self) -> Result<(), AppError> {
        self.transition(TicketStatus::Accepted)
    }

    /// Responder declines the need.
    pub fn reject(&mut self) -> Result<(), AppError> {
        self.transition(TicketStatus::Rejected)
    }

    /// Attach scheduling detail and move `accepted → scheduled`.
    pub fn schedule(&mut self, detail: SchedulingDetail) -> Result<(), AppError> {
        if self.status == TicketStatus::Scheduled {
            return Err(AppError::invalid_transition(format!(
                "Ticket {} is already scheduled; use reschedule to change the slot",
                self.id
            )));
        }
        self.transition(TicketStatus::Scheduled)?;
        self.scheduling = Some(detail);
        Ok(())
    }

    /// Replace the scheduling detail without changing status.
    ///
    /// Only allowed while scheduled and before the requester has confirmed
    /// the handoff.
    pub fn reschedule(&mut self, detail: SchedulingDetail) -> Result<(), AppError> {
        if self.status != TicketStatus::Scheduled {
            return Err(AppError::invalid_transition(format!(
                "Ticket {} can only be rescheduled while scheduled (currently {})",
                self.id, self.status
            )));
        }
        if self.requester_confirmed {
            return Err(AppError::invalid_transition(format!(
                "Ticket {} pickup was already confirmed by the requester",
                self.id
            )));
        }
        self.scheduling = Some(detail);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Requester acknowledges the physical handoff. Status is unchanged.
    pub fn confirm_pickup(&mut self) -> Result<(), AppError> {
        if self.requester_confirmed {
            return Err(AppError::duplicate_action(format!(
                "Pickup for ticket {} was already confirmed",
                self.id
            )));
        }
        if self.status != TicketStatus::Scheduled {
            return Err(AppError::invalid_transition(format!(
                "Ticket {} must be scheduled before pickup can be confirmed (currently {})",
                self.id, self.status
            )));
        }
        let now = Utc::now();
        self.requester_confirmed = true;
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Responder closes the ticket: `scheduled → completed`, gated on confirmation.
    pub fn complete(&mut self) -> Result<(), AppError> {
        if !self.requester_confirmed {
            return Err(AppError::invalid_transition(format!(
                "Ticket {} is waiting for pickup confirmation",
                self.id
            )));
        }
        self.transition(TicketStatus::Completed)
    }

    /// Record the requester's one-time feedback on a completed ticket.
    pub fn record_feedback(
        &mut self,
        rating: i64,
        comment: Option<String>,
    ) -> Result<&Feedback, AppError> {
        if self.feedback.is_some() {
            return Err(AppError::duplicate_action(format!(
                "Feedback for ticket {} was already submitted",
                self.id
            )));
        }
        if self.status != TicketStatus::Completed {
            return Err(AppError::invalid_transition(format!(
                "Feedback can only be left on a completed ticket (ticket {} is {})",
                self.id, self.status
            )));
        }
        let feedback = Feedback::new(rating, comment)?;
        self.updated_at = feedback.submitted_at;
        Ok(self.feedback.insert(feedback))
    }
}
