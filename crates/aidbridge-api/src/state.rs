//! Application state shared across all handlers.

use std::sync::Arc;

use aidbridge_core::config::AppConfig;
use aidbridge_database::Store;
use aidbridge_service::{
    ConfirmationService, DispatchService, InboxService, NeedService, PickupService,
    PushDispatcher, ResponderService, SchedulingService, ScoringEngine, TicketService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every service is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Persistence ──────────────────────────────────────────
    /// Entity stores, used directly only for health probing
    pub store: Store,

    // ── Services ─────────────────────────────────────────────
    /// Need registration and aggregate status
    pub needs: NeedService,
    /// Responder registry
    pub responders: ResponderService,
    /// Dispatch fan-out
    pub dispatch: DispatchService,
    /// Accept, reject, complete
    pub tickets: TicketService,
    /// Schedule and reschedule
    pub scheduling: SchedulingService,
    /// Requester confirmation and feedback
    pub confirmation: ConfirmationService,
    /// Donation pickup logistics
    pub pickups: PickupService,
    /// Responder inbox
    pub inbox: InboxService,
    /// Points and badges
    pub scoring: ScoringEngine,
}

impl AppState {
    /// Wire every service over one store and push dispatcher.
    pub fn new(config: AppConfig, store: Store, push: PushDispatcher) -> Self {
        let scoring = ScoringEngine::new(store.clone(), &config.scoring);

        Self {
            needs: NeedService::new(store.clone()),
            responders: ResponderService::new(store.clone()),
            dispatch: DispatchService::new(store.clone(), push),
            tickets: TicketService::new(store.clone(), scoring.clone()),
            scheduling: SchedulingService::new(store.clone()),
            confirmation: ConfirmationService::new(store.clone(), scoring.clone()),
            pickups: PickupService::new(store.clone()),
            inbox: InboxService::new(store.clone()),
            scoring,
            store,
            config: Arc::new(config),
        }
    }
}
