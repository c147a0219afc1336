//! Pickup event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidbridge_core::AppError;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{PickupEventId, TicketId};

use super::status::PickupStatus;

const MAX_PROOF_IMAGES: usize = 10;
const MAX_NOTES_LEN: usize = 2000;

/// Logistics sub-record of a donation ticket, one per ticket.
///
/// Progress here never changes the ticket's own status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupEvent {
    /// Unique identifier.
    pub id: PickupEventId,
    /// The owning donation ticket.
    pub ticket_id: TicketId,
    /// Where the items are collected.
    pub pickup_location: GeoPoint,
    /// Where the items are delivered.
    pub drop_location: GeoPoint,
    /// Current status.
    pub status: PickupStatus,
    /// Booked slot, mirrored from the ticket's scheduling detail.
    pub scheduled_at: DateTime<Utc>,
    /// When the items were collected.
    pub picked_at: Option<DateTime<Utc>>,
    /// When the items were delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// References to proof-of-delivery images held by the file store.
    pub proof_images: Vec<String>,
    /// Free-text notes from the volunteer.
    pub delivery_notes: Option<String>,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PickupEvent {
    /// Create a scheduled pickup.
    pub fn new(
        ticket_id: TicketId,
        pickup_location: GeoPoint,
        drop_location: GeoPoint,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PickupEventId::new(),
            ticket_id,
            pickup_location,
            drop_location,
            status: PickupStatus::Scheduled,
            scheduled_at,
            picked_at: None,
            delivered_at: None,
            proof_images: Vec::new(),
            delivery_notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: PickupStatus) -> Result<DateTime<Utc>, AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::invalid_transition(format!(
                "Pickup {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        Ok(now)
    }

    /// Move the booked slot. Only while still scheduled.
    pub fn reschedule(&mut self, scheduled_at: DateTime<Utc>) -> Result<(), AppError> {
        if self.status != PickupStatus::Scheduled {
            return Err(AppError::invalid_transition(format!(
                "Pickup {} can no longer be rescheduled (currently {})",
                self.id, self.status
            )));
        }
        self.scheduled_at = scheduled_at;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Items collected.
    pub fn start(&mut self) -> Result<(), AppError> {
        let now = self.transition(PickupStatus::InProgress)?;
        self.picked_at = Some(now);
        Ok(())
    }

    /// Items delivered.
    pub fn complete(
        &mut self,
        proof_images: Vec<String>,
        notes: Option<String>,
    ) -> Result<(), AppError> {
        if proof_images.len() > MAX_PROOF_IMAGES {
            return Err(AppError::validation(format!(
                "At most {MAX_PROOF_IMAGES} proof images are allowed"
            )));
        }
        if proof_images.iter().any(|r| r.trim().is_empty()) {
            return Err(AppError::validation("Proof image references must not be blank"));
        }
        let notes = clean_notes(notes)?;
        let now = self.transition(PickupStatus::Completed)?;
        self.delivered_at = Some(now);
        self.proof_images = proof_images;
        self.delivery_notes = notes;
        Ok(())
    }

    /// Pickup could not be carried out.
    pub fn fail(&mut self, notes: Option<String>) -> Result<(), AppError> {
        let notes = clean_notes(notes)?;
        self.transition(PickupStatus::Failed)?;
        self.delivery_notes = notes;
        Ok(())
    }

    /// Called off before collection.
    pub fn cancel(&mut self) -> Result<(), AppError> {
        self.transition(PickupStatus::Cancelled).map(|_| ())
    }
}

fn clean_notes(notes: Option<String>) -> Result<Option<String>, AppError> {
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if notes
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
    {
        return Err(AppError::validation(format!(
            "Notes must be at most {MAX_NOTES_LEN} characters"
        )));
    }
    Ok(notes)
}
