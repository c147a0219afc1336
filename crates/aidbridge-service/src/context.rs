//! Request context carrying the authenticated actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aidbridge_core::AppError;
use aidbridge_core::types::id::{ResponderId, UserId};
use aidbridge_entity::actor::ActorRole;

/// Context for the current authenticated request.
///
/// Authentication happens upstream. The context is passed into every
/// service method so that each operation knows who is acting and can check
/// entitlement against the records it touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated actor's id. For responders this is the responder id.
    pub actor_id: Uuid,
    /// The role the actor is acting in.
    pub role: ActorRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(actor_id: Uuid, role: ActorRole) -> Self {
        Self {
            actor_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Context for a requester.
    pub fn requester(id: UserId) -> Self {
        Self::new(id.into_uuid(), ActorRole::Requester)
    }

    /// Context for a responder.
    pub fn responder(id: ResponderId) -> Self {
        Self::new(id.into_uuid(), ActorRole::Responder)
    }

    /// The actor as a requester, or an authorization error.
    pub fn require_requester(&self) -> Result<UserId, AppError> {
        match self.role {
            ActorRole::Requester => Ok(UserId::from_uuid(self.actor_id)),
            ActorRole::Responder => Err(AppError::authorization(
                "This action is only available to requesters",
            )),
        }
    }

    /// The actor as a responder, or an authorization error.
    pub fn require_responder(&self) -> Result<ResponderId, AppError> {
        match self.role {
            ActorRole::Responder => Ok(ResponderId::from_uuid(self.actor_id)),
            ActorRole::Requester => Err(AppError::authorization(
                "This action is only available to responders",
            )),
        }
    }

    /// Whether this actor is the given responder.
    pub fn is_responder(&self, id: ResponderId) -> bool {
        self.role == ActorRole::Responder && self.actor_id == id.into_uuid()
    }

    /// Whether this actor is the given requester.
    pub fn is_requester(&self, id: UserId) -> bool {
        self.role == ActorRole::Requester && self.actor_id == id.into_uuid()
    }
}
