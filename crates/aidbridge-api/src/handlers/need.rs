//! Need and dispatch handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use aidbridge_core::types::id::NeedId;
use aidbridge_core::types::pagination::PageResponse;
use aidbridge_entity::need::Need;
use aidbridge_service::{DispatchOutcome, NeedSummary, NeedView};

use crate::dto::request::{CreateNeedRequest, DispatchRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, PaginationParams, ValidJson};
use crate::state::AppState;

/// POST /api/needs
pub async fn create_need(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateNeedRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Need>>), ApiError> {
    let need = state.needs.create_need(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(need))))
}

/// GET /api/needs
pub async fn list_my_needs(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<NeedSummary>>>, ApiError> {
    let page = state
        .needs
        .list_my_needs(&actor, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/needs/{id}
pub async fn get_need(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NeedView>>, ApiError> {
    let view = state.needs.get_need(&actor, NeedId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/needs/{id}/dispatch
pub async fn dispatch(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<DispatchRequest>,
) -> Result<Json<ApiResponse<DispatchOutcome>>, ApiError> {
    let outcome = state
        .dispatch
        .dispatch(&actor, NeedId::from_uuid(id), &req.responder_ids())
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
