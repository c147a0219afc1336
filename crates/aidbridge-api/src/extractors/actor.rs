//! `Actor` extractor: reads the identity set by the authentication gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use aidbridge_core::AppError;
use aidbridge_entity::actor::ActorRole;
use aidbridge_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated actor id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the actor's role (`requester` or `responder`).
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Authenticated actor context available in handlers.
#[derive(Debug, Clone)]
pub struct Actor(pub RequestContext);

impl std::ops::Deref for Actor {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::authorization(format!("Missing {name} header")))
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, ACTOR_ID_HEADER)?;
        let actor_id = Uuid::parse_str(id)
            .map_err(|_| AppError::validation(format!("Invalid {ACTOR_ID_HEADER}: {id}")))?;
        let role: ActorRole = header(parts, ACTOR_ROLE_HEADER)?.parse()?;

        Ok(Actor(RequestContext::new(actor_id, role)))
    }
}
