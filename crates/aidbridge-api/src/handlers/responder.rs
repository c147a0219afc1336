//! Responder registry handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use aidbridge_core::AppError;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::ResponderId;
use aidbridge_database::store::NearbyResponder;
use aidbridge_entity::responder::Responder;

use crate::dto::request::{NearestQuery, RegisterResponderRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, ValidJson};
use crate::state::AppState;

/// POST /api/responders
pub async fn register(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<RegisterResponderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Responder>>), ApiError> {
    let responder = state.responders.register(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(responder))))
}

/// GET /api/responders/nearest?lat=..&lon=..&limit=..&category=..
pub async fn nearest(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<NearestQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyResponder>>>, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let found = state
        .responders
        .nearest(
            GeoPoint::new(query.lat, query.lon),
            query.limit,
            query.category.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(found)))
}

/// GET /api/responders/{id}
pub async fn get_responder(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Responder>>, ApiError> {
    let responder = state.responders.get(ResponderId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(responder)))
}
