//! Route definitions for the AidBridge HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API router and bind it to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(need_routes())
        .merge(responder_routes())
        .merge(ticket_routes())
        .merge(pickup_routes())
        .merge(inbox_routes())
        .merge(score_routes())
        .route("/health", get(handlers::health::health));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Needs, offers and dispatch
fn need_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/needs",
            get(handlers::need::list_my_needs).post(handlers::need::create_need),
        )
        .route("/needs/{id}", get(handlers::need::get_need))
        .route("/needs/{id}/dispatch", post(handlers::need::dispatch))
}

/// Responder registry
fn responder_routes() -> Router<AppState> {
    Router::new()
        .route("/responders", post(handlers::responder::register))
        .route("/responders/nearest", get(handlers::responder::nearest))
        .route("/responders/{id}", get(handlers::responder::get_responder))
}

/// Ticket state machine, scheduling and confirmation
fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets/{id}", get(handlers::ticket::get_ticket))
        .route("/tickets/{id}/accept", post(handlers::ticket::accept))
        .route("/tickets/{id}/reject", post(handlers::ticket::reject))
        .route("/tickets/{id}/schedule", post(handlers::ticket::schedule))
        .route("/tickets/{id}/reschedule", post(handlers::ticket::reschedule))
        .route("/tickets/{id}/complete", post(handlers::ticket::complete))
        .route("/tickets/{id}/confirm", post(handlers::ticket::confirm))
        .route("/tickets/{id}/feedback", post(handlers::ticket::feedback))
}

/// Donation pickup logistics
fn pickup_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets/{id}/pickup", get(handlers::pickup::get_pickup))
        .route("/tickets/{id}/pickup/start", post(handlers::pickup::start))
        .route("/tickets/{id}/pickup/deliver", post(handlers::pickup::deliver))
        .route("/tickets/{id}/pickup/fail", post(handlers::pickup::fail))
        .route("/tickets/{id}/pickup/cancel", post(handlers::pickup::cancel))
}

/// Responder inbox
fn inbox_routes() -> Router<AppState> {
    Router::new()
        .route("/inbox", get(handlers::inbox::list))
        .route("/inbox/unread-count", get(handlers::inbox::unread_count))
        .route("/inbox/read-all", post(handlers::inbox::mark_all_read))
        .route("/inbox/{need_id}/read", post(handlers::inbox::mark_read))
}

/// Points and badges
fn score_routes() -> Router<AppState> {
    Router::new().route(
        "/scores/{actor_type}/{actor_id}",
        get(handlers::score::get_score),
    )
}
