//! Shared harness for workflow scenario tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use aidbridge_core::config::{PushConfig, ScoringConfig};
use aidbridge_core::result::AppResult;
use aidbridge_core::traits::{PushPayload, PushTransport};
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId, UserId};
use aidbridge_database::Store;
use aidbridge_entity::need::{CreateNeed, Need, NeedKind};
use aidbridge_entity::responder::CreateResponder;
use aidbridge_entity::ticket::ScheduleRequest;
use aidbridge_service::{
    ConfirmationService, DispatchService, InboxService, NeedService, PickupService,
    PushDispatcher, RequestContext, ResponderService, SchedulingService, ScoringEngine,
    TicketService,
};

#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub delivered: Mutex<Vec<PushPayload>>,
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn deliver(&self, payload: &PushPayload) -> AppResult<()> {
        self.delivered.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct Harness {
    pub store: Store,
    pub needs: NeedService,
    pub responders: ResponderService,
    pub dispatch: DispatchService,
    pub tickets: TicketService,
    pub scheduling: SchedulingService,
    pub confirmation: ConfirmationService,
    pub pickups: PickupService,
    pub inbox: InboxService,
    pub scoring: ScoringEngine,
    pub transport: Arc<RecordingTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Store::memory())
    }

    /// Services wired over `store`, for tests that wrap individual stores.
    pub fn with_store(store: Store) -> Self {
        let scoring = ScoringEngine::new(
            store.clone(),
            &ScoringConfig {
                completion_points: 120,
                ..ScoringConfig::default()
            },
        );
        let transport = Arc::new(RecordingTransport::default());
        let push_config = PushConfig {
            retry_backoff_ms: 1,
            ..PushConfig::default()
        };
        let (push, _) = PushDispatcher::start(&push_config, transport.clone());

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
            transport,
        }
    }

    pub async fn register_responder(&self, name: &str, lat: f64, lon: f64) -> RequestContext {
        let ctx = RequestContext::responder(ResponderId::new());
        self.responders
            .register(
                &ctx,
                CreateResponder {
                    name: name.into(),
                    categories: vec!["food".into(), "clothing".into()],
                    location: GeoPoint::new(lat, lon),
                    contact_email: None,
                },
            )
            .await
            .unwrap();
        ctx
    }

    pub async fn create_need(&self, requester: &RequestContext, kind: NeedKind, emergency: bool) -> Need {
        self.needs
            .create_need(
                requester,
                CreateNeed {
                    kind,
                    category: "food".into(),
                    description: "Rice and lentils for twelve households".into(),
                    location: GeoPoint::new(19.076, 72.8777),
                    address: Some("Dharavi community hall".into()),
                    drop_location: None,
                    emergency,
                },
            )
            .await
            .unwrap()
    }

    /// Ticket id of `responder`'s ticket for `need`.
    pub async fn ticket_of(&self, need_id: NeedId, responder: &RequestContext) -> TicketId {
        self.store
            .tickets
            .find_by_pair(need_id, ResponderId::from_uuid(responder.actor_id))
            .await
            .unwrap()
            .unwrap()
            .id
    }

    /// Wait until at least `n` pushes were delivered.
    pub async fn wait_for_pushes(&self, n: usize) -> Vec<PushPayload> {
        for _ in 0..200 {
            let delivered = self.transport.delivered.lock().unwrap().clone();
            if delivered.len() >= n {
                return delivered;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {n} pushes");
    }
}

pub fn requester() -> RequestContext {
    RequestContext::requester(UserId::new())
}

pub fn responder_id(ctx: &RequestContext) -> ResponderId {
    ResponderId::from_uuid(ctx.actor_id)
}

pub fn slot() -> ScheduleRequest {
    ScheduleRequest::new("V", "9999999999", "2025-01-10", "10:00")
}
