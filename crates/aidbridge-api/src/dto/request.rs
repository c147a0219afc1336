//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::ResponderId;
use aidbridge_entity::need::{CreateNeed, NeedKind};
use aidbridge_entity::responder::CreateResponder;

fn default_kind() -> NeedKind {
    NeedKind::Need
}

/// Register a need or donation offer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNeedRequest {
    /// `need` or `offer`.
    #[serde(default = "default_kind")]
    pub kind: NeedKind,
    /// Category such as `food` or `medical`.
    #[validate(length(min = 1, max = 64, message = "Category is required"))]
    pub category: String,
    /// Free-text description.
    #[validate(length(min = 1, max = 4000, message = "Description is required"))]
    pub description: String,
    /// Where the need is.
    pub location: GeoPoint,
    /// Optional street address.
    #[validate(length(max = 500))]
    pub address: Option<String>,
    /// Where donated goods should go.
    pub drop_location: Option<GeoPoint>,
    /// Emergency flag.
    #[serde(default)]
    pub emergency: bool,
}

impl From<CreateNeedRequest> for CreateNeed {
    fn from(req: CreateNeedRequest) -> Self {
        Self {
            kind: req.kind,
            category: req.category,
            description: req.description,
            location: req.location,
            address: req.address,
            drop_location: req.drop_location,
            emergency: req.emergency,
        }
    }
}

/// Dispatch a need to chosen responders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchRequest {
    /// Responder ids, in the order chosen.
    #[validate(length(min = 1, max = 100, message = "Select between 1 and 100 responders"))]
    pub responder_ids: Vec<Uuid>,
}

impl DispatchRequest {
    /// The ids as typed responder ids.
    pub fn responder_ids(&self) -> Vec<ResponderId> {
        self.responder_ids
            .iter()
            .copied()
            .map(ResponderId::from_uuid)
            .collect()
    }
}

/// Register the calling responder's organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterResponderRequest {
    /// Organization name.
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Capability categories.
    #[serde(default)]
    #[validate(length(max = 32))]
    pub categories: Vec<String>,
    /// Base location.
    pub location: GeoPoint,
    /// Contact email.
    #[validate(email)]
    pub contact_email: Option<String>,
}

impl From<RegisterResponderRequest> for CreateResponder {
    fn from(req: RegisterResponderRequest) -> Self {
        Self {
            name: req.name,
            categories: req.categories,
            location: req.location,
            contact_email: req.contact_email,
        }
    }
}

fn default_limit() -> usize {
    10
}

/// Query for the nearest responders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearestQuery {
    /// Latitude of the query point.
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    /// Longitude of the query point.
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    /// How many responders to return.
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: usize,
    /// Only responders handling this category.
    pub category: Option<String>,
}

/// Leave feedback on a completed ticket.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackRequest {
    /// Rating 1-5.
    pub rating: i64,
    /// Optional comment.
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// Record a completed delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DeliverRequest {
    /// References to proof photos.
    #[serde(default)]
    #[validate(length(max = 10))]
    pub proof_images: Vec<String>,
    /// Delivery notes.
    pub notes: Option<String>,
}

/// Record a failed pickup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FailPickupRequest {
    /// Why the pickup failed.
    pub notes: Option<String>,
}
