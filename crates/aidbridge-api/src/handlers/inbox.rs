//! Responder inbox handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use aidbridge_core::types::id::NeedId;
use aidbridge_core::types::pagination::PageResponse;
use aidbridge_database::store::UnreadCounts;
use aidbridge_entity::notification::NotificationRecord;

use crate::dto::response::{ApiResponse, MarkedResponse, ReadResponse};
use crate::error::ApiError;
use crate::extractors::{Actor, PaginationParams};
use crate::state::AppState;

/// GET /api/inbox
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<NotificationRecord>>>, ApiError> {
    let page = state
        .inbox
        .list(&actor, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/inbox/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ApiResponse<UnreadCounts>>, ApiError> {
    let counts = state.inbox.unread_counts(&actor).await?;
    Ok(Json(ApiResponse::ok(counts)))
}

/// POST /api/inbox/{need_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    actor: Actor,
    Path(need_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReadResponse>>, ApiError> {
    let changed = state
        .inbox
        .mark_read(&actor, NeedId::from_uuid(need_id))
        .await?;
    Ok(Json(ApiResponse::ok(ReadResponse { changed })))
}

/// POST /api/inbox/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ApiResponse<MarkedResponse>>, ApiError> {
    let marked = state.inbox.mark_all_read(&actor).await?;
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}
