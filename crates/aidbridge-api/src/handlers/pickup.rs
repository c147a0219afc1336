//! Donation pickup handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use aidbridge_core::types::id::TicketId;
use aidbridge_entity::pickup::PickupEvent;

use crate::dto::request::{DeliverRequest, FailPickupRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, ValidJson};
use crate::state::AppState;

type PickupResponse = Result<Json<ApiResponse<PickupEvent>>, ApiError>;

/// GET /api/tickets/{id}/pickup
pub async fn get_pickup(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> PickupResponse {
    let pickup = state.pickups.get_pickup(&actor, TicketId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(pickup)))
}

/// POST /api/tickets/{id}/pickup/start
pub async fn start(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> PickupResponse {
    let pickup = state
        .pickups
        .start_pickup(&actor, TicketId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(pickup)))
}

/// POST /api/tickets/{id}/pickup/deliver
pub async fn deliver(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<DeliverRequest>,
) -> PickupResponse {
    let pickup = state
        .pickups
        .complete_delivery(&actor, TicketId::from_uuid(id), req.proof_images, req.notes)
        .await?;
    Ok(Json(ApiResponse::ok(pickup)))
}

/// POST /api/tickets/{id}/pickup/fail
pub async fn fail(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<FailPickupRequest>,
) -> PickupResponse {
    let pickup = state
        .pickups
        .fail_pickup(&actor, TicketId::from_uuid(id), req.notes)
        .await?;
    Ok(Json(ApiResponse::ok(pickup)))
}

/// POST /api/tickets/{id}/pickup/cancel
pub async fn cancel(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> PickupResponse {
    let pickup = state
        .pickups
        .cancel_pickup(&actor, TicketId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(pickup)))
}
