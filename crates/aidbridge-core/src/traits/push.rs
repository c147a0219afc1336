//! Push notification transport trait.
//!
//! The transport is an external collaborator: the core hands it a payload
//! addressed to a responder and never waits on an acknowledgement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::{NeedId, ResponderId, TicketId};

/// A push request addressed to one responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    /// Recipient responder.
    pub responder_id: ResponderId,
    /// The need or offer the push concerns.
    pub need_id: NeedId,
    /// The responder's ticket for that need.
    pub ticket_id: TicketId,
    /// Short title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Whether the need is flagged as an emergency.
    pub emergency: bool,
}

/// Delivers push requests to an external notification service.
///
/// Implementations may fail; callers treat failures as transient and retry
/// a bounded number of times. Delivery is at-least-once.
#[async_trait]
pub trait PushTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver a single push request.
    async fn deliver(&self, payload: &PushPayload) -> AppResult<()>;

    /// Short name used in log fields.
    fn name(&self) -> &'static str;
}
