//! Score handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use aidbridge_entity::ledger::ActorType;
use aidbridge_service::Score;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::state::AppState;

/// GET /api/scores/{actor_type}/{actor_id}
pub async fn get_score(
    State(state): State<AppState>,
    _actor: Actor,
    Path((actor_type, actor_id)): Path<(String, Uuid)>,
) -> Result<Json<ApiResponse<Score>>, ApiError> {
    let actor_type: ActorType = actor_type.parse()?;
    let score = state.scoring.score_for(actor_type, actor_id).await?;
    Ok(Json(ApiResponse::ok(score)))
}
