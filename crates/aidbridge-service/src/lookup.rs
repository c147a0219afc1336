//! Loaders that turn a missing record into `NotFound`.

use aidbridge_core::AppError;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};
use aidbridge_database::Store;
use aidbridge_entity::need::Need;
use aidbridge_entity::responder::Responder;
use aidbridge_entity::ticket::HandlingTicket;

pub(crate) async fn need(store: &Store, id: NeedId) -> AppResult<Need> {
    store
        .needs
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Need {id} not found")))
}

pub(crate) async fn ticket(store: &Store, id: TicketId) -> AppResult<HandlingTicket> {
    store
        .tickets
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))
}

pub(crate) async fn responder(store: &Store, id: ResponderId) -> AppResult<Responder> {
    store
        .responders
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Responder {id} not found")))
}
