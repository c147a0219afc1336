//! Ticket workflow handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use aidbridge_core::types::id::TicketId;
use aidbridge_entity::ticket::{HandlingTicket, ScheduleRequest};
use aidbridge_service::{ScheduledTicket, TicketView};

use crate::dto::request::FeedbackRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, JsonBody, ValidJson};
use crate::state::AppState;

type TicketResponse = Result<Json<ApiResponse<HandlingTicket>>, ApiError>;

/// GET /api/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketView>>, ApiError> {
    let view = state.tickets.get_ticket(&actor, TicketId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/tickets/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> TicketResponse {
    let ticket = state.tickets.accept(&actor, TicketId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> TicketResponse {
    let ticket = state.tickets.reject(&actor, TicketId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/schedule
pub async fn schedule(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<ScheduleRequest>,
) -> Result<Json<ApiResponse<ScheduledTicket>>, ApiError> {
    let scheduled = state
        .scheduling
        .schedule(&actor, TicketId::from_uuid(id), &req)
        .await?;
    Ok(Json(ApiResponse::ok(scheduled)))
}

/// POST /api/tickets/{id}/reschedule
pub async fn reschedule(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<ScheduleRequest>,
) -> Result<Json<ApiResponse<ScheduledTicket>>, ApiError> {
    let scheduled = state
        .scheduling
        .reschedule(&actor, TicketId::from_uuid(id), &req)
        .await?;
    Ok(Json(ApiResponse::ok(scheduled)))
}

/// POST /api/tickets/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> TicketResponse {
    let ticket = state
        .tickets
        .mark_completed(&actor, TicketId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> TicketResponse {
    let ticket = state
        .confirmation
        .confirm_pickup(&actor, TicketId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets/{id}/feedback
pub async fn feedback(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<FeedbackRequest>,
) -> TicketResponse {
    let ticket = state
        .confirmation
        .submit_feedback(&actor, TicketId::from_uuid(id), req.rating, req.comment)
        .await?;
    Ok(Json(ApiResponse::ok(ticket)))
}
