//! Notification record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};

use super::status::InboxStatus;
use crate::ticket::TicketStatus;

/// A responder's inbox entry for one dispatched need.
///
/// Keyed by (need, responder). Not authoritative for workflow state; the
/// ticket is. The `status` mirror is rewritten with every ticket transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// The dispatched need.
    pub need_id: NeedId,
    /// The recipient responder.
    pub responder_id: ResponderId,
    /// The ticket created by the same dispatch.
    pub ticket_id: TicketId,
    /// When the responder was notified.
    pub notified_at: DateTime<Utc>,
    /// Whether the responder has read it.
    pub read: bool,
    /// When it was read.
    pub read_at: Option<DateTime<Utc>>,
    /// Copied from the need at dispatch time.
    pub emergency: bool,
    /// Status mirror.
    pub status: InboxStatus,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Create a fresh unread record for a new ticket.
    pub fn new(
        need_id: NeedId,
        responder_id: ResponderId,
        ticket_id: TicketId,
        emergency: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            need_id,
            responder_id,
            ticket_id,
            notified_at: now,
            read: false,
            read_at: None,
            emergency,
            status: InboxStatus::New,
            updated_at: now,
        }
    }

    /// Rewrite the mirror from the ticket's status.
    pub fn mirror(&mut self, status: TicketStatus) {
        self.status = status.into();
        self.updated_at = Utc::now();
    }

    /// Mark as read. Returns `false` if it already was.
    pub fn mark_read(&mut self) -> bool {
        if self.read {
            return false;
        }
        let now = Utc::now();
        self.read = true;
        self.read_at = Some(now);
        self.updated_at = now;
        true
    }
}
