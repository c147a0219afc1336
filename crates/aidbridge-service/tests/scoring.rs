//! Ledger credits, badges and the responder projection.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use aidbridge_core::AppError;
use aidbridge_core::error::ErrorKind;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{ResponderId, TicketId};
use aidbridge_database::Store;
use aidbridge_database::store::{LedgerStore, NearbyResponder, ResponderStore};
use aidbridge_entity::ledger::{ActorType, LedgerEntry, NewLedgerEntry};
use aidbridge_entity::need::NeedKind;
use aidbridge_entity::responder::Responder;
use aidbridge_entity::ticket::TicketStatus;

use common::{Harness, requester, responder_id, slot};

/// Holds back the projection write of the first ledger snapshot.
#[derive(Debug)]
struct SlowFirstScore {
    inner: Arc<dyn ResponderStore>,
}

#[async_trait]
impl ResponderStore for SlowFirstScore {
    async fn insert(&self, responder: &Responder) -> AppResult<()> {
        self.inner.insert(responder).await
    }

    async fn find_by_id(&self, id: ResponderId) -> AppResult<Option<Responder>> {
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, ids: &[ResponderId]) -> AppResult<Vec<Responder>> {
        self.inner.find_many(ids).await
    }

    async fn nearest(
        &self,
        point: GeoPoint,
        limit: usize,
        category: Option<&str>,
    ) -> AppResult<Vec<NearbyResponder>> {
        self.inner.nearest(point, limit, category).await
    }

    async fn apply_score(
        &self,
        id: ResponderId,
        points: i64,
        entries: i64,
        badges: &[String],
    ) -> AppResult<Responder> {
        if entries == 1 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.inner.apply_score(id, points, entries, badges).await
    }
}

/// Fails the next append while `fail_next` is set.
#[derive(Debug)]
struct FlakyLedger {
    inner: Arc<dyn LedgerStore>,
    fail_next: AtomicBool,
}

#[async_trait]
impl LedgerStore for FlakyLedger {
    async fn append(&self, entry: NewLedgerEntry) -> AppResult<Option<LedgerEntry>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("ledger unavailable"));
        }
        self.inner.append(entry).await
    }

    async fn find_for_ticket(
        &self,
        ticket_id: TicketId,
        actor_type: ActorType,
    ) -> AppResult<Option<LedgerEntry>> {
        self.inner.find_for_ticket(ticket_id, actor_type).await
    }

    async fn entries_for(
        &self,
        actor_type: ActorType,
        actor_id: Uuid,
    ) -> AppResult<Vec<LedgerEntry>> {
        self.inner.entries_for(actor_type, actor_id).await
    }
}

fn flaky_harness() -> (Harness, Arc<FlakyLedger>) {
    let store = Store::memory();
    let ledger = Arc::new(FlakyLedger {
        inner: store.ledger.clone(),
        fail_next: AtomicBool::new(false),
    });
    let harness = Harness::with_store(Store {
        ledger: ledger.clone(),
        ..store
    });
    (harness, ledger)
}

#[tokio::test]
async fn test_three_completions_earn_bronze_and_silver() {
    let h = Harness::new();
    let a = h.register_responder("NGO A", 19.08, 72.88).await;

    for _ in 0..3 {
        let owner = requester();
        let need = h.create_need(&owner, NeedKind::Need, false).await;
        h.dispatch
            .dispatch(&owner, need.id, &[responder_id(&a)])
            .await
            .unwrap();
        let ticket = h.ticket_of(need.id, &a).await;
        h.tickets.accept(&a, ticket).await.unwrap();
        h.scheduling.schedule(&a, ticket, &slot()).await.unwrap();
        h.confirmation.confirm_pickup(&owner, ticket).await.unwrap();
        h.tickets.mark_completed(&a, ticket).await.unwrap();
    }

    let score = h
        .scoring
        .score_for(ActorType::Responder, a.actor_id)
        .await
        .unwrap();
    assert_eq!(score.points, 360);
    assert_eq!(score.badges, vec!["Bronze".to_string(), "Silver".to_string()]);
    assert_eq!(score.next_badge.as_ref().map(|t| t.name.clone()), Some("Gold".to_string()));

    let responder = h.responders.get(responder_id(&a)).await.unwrap();
    assert_eq!(responder.points, 360);
    assert_eq!(responder.badges, score.badges);

    let again = h
        .scoring
        .recompute(ActorType::Responder, a.actor_id)
        .await
        .unwrap();
    assert_eq!(again, score);
}

#[tokio::test]
async fn test_projection_keeps_badges_after_penalty() {
    let h = Harness::new();
    let a = h.register_responder("NGO A", 19.08, 72.88).await;

    for delta in [120, 120, 120, -100] {
        h.scoring
            .credit(NewLedgerEntry {
                actor_type: ActorType::Responder,
                actor_id: a.actor_id,
                description: "Manual adjustment".into(),
                points_delta: delta,
                ticket_id: None,
            })
            .await
            .unwrap();
    }

    let responder = h.responders.get(responder_id(&a)).await.unwrap();
    assert_eq!(responder.points, 260);
    assert_eq!(
        responder.badges,
        vec!["Bronze".to_string(), "Silver".to_string()]
    );

    let score = h
        .scoring
        .score_for(ActorType::Responder, a.actor_id)
        .await
        .unwrap();
    assert_eq!(score.badges, vec!["Bronze".to_string()]);
}

#[tokio::test]
async fn test_concurrent_credits_leave_projection_at_ledger_total() {
    let store = Store::memory();
    let h = Harness::with_store(Store {
        responders: Arc::new(SlowFirstScore {
            inner: store.responders.clone(),
        }),
        ..store
    });
    let a = h.register_responder("NGO A", 19.08, 72.88).await;
    let id = responder_id(&a);

    let (first, second) = tokio::join!(h.scoring.credit_completion(id, TicketId::new()), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        h.scoring.credit_completion(id, TicketId::new()).await
    });
    first.unwrap();
    second.unwrap();

    let ledger = h
        .scoring
        .score_for(ActorType::Responder, a.actor_id)
        .await
        .unwrap();
    let responder = h.responders.get(id).await.unwrap();
    assert_eq!(ledger.points, 240);
    assert_eq!(responder.points, ledger.points);
}

#[tokio::test]
async fn test_completion_credit_is_retried_after_ledger_failure() {
    let (h, ledger) = flaky_harness();
    let owner = requester();
    let a = h.register_responder("NGO A", 19.08, 72.88).await;
    let need = h.create_need(&owner, NeedKind::Need, false).await;
    h.dispatch
        .dispatch(&owner, need.id, &[responder_id(&a)])
        .await
        .unwrap();
    let ticket = h.ticket_of(need.id, &a).await;
    h.tickets.accept(&a, ticket).await.unwrap();
    h.scheduling.schedule(&a, ticket, &slot()).await.unwrap();
    h.confirmation.confirm_pickup(&owner, ticket).await.unwrap();

    ledger.fail_next.store(true, Ordering::SeqCst);
    let err = h.tickets.mark_completed(&a, ticket).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    let view = h.tickets.get_ticket(&a, ticket).await.unwrap();
    assert_eq!(view.ticket.status, TicketStatus::Completed);
    assert!(
        !h.scoring
            .is_credited(ticket, ActorType::Responder)
            .await
            .unwrap()
    );

    let repaired = h.tickets.mark_completed(&a, ticket).await.unwrap();
    assert_eq!(repaired.status, TicketStatus::Completed);
    let score = h
        .scoring
        .score_for(ActorType::Responder, a.actor_id)
        .await
        .unwrap();
    assert_eq!(score.points, 120);
    assert_eq!(h.responders.get(responder_id(&a)).await.unwrap().points, 120);

    let err = h.tickets.mark_completed(&a, ticket).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);
}

#[tokio::test]
async fn test_feedback_credit_is_retried_after_ledger_failure() {
    let (h, ledger) = flaky_harness();
    let owner = requester();
    let a = h.register_responder("NGO A", 19.08, 72.88).await;
    let need = h.create_need(&owner, NeedKind::Need, false).await;
    h.dispatch
        .dispatch(&owner, need.id, &[responder_id(&a)])
        .await
        .unwrap();
    let ticket = h.ticket_of(need.id, &a).await;
    h.tickets.accept(&a, ticket).await.unwrap();
    h.scheduling.schedule(&a, ticket, &slot()).await.unwrap();
    h.confirmation.confirm_pickup(&owner, ticket).await.unwrap();
    h.tickets.mark_completed(&a, ticket).await.unwrap();

    ledger.fail_next.store(true, Ordering::SeqCst);
    let err = h
        .confirmation
        .submit_feedback(&owner, ticket, 5, Some("Fast".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    let repaired = h
        .confirmation
        .submit_feedback(&owner, ticket, 1, None)
        .await
        .unwrap();
    let feedback = repaired.feedback.unwrap();
    assert_eq!(feedback.rating, 5);
    let score = h
        .scoring
        .score_for(ActorType::Requester, owner.actor_id)
        .await
        .unwrap();
    assert_eq!(score.points, 10);

    let err = h
        .confirmation
        .submit_feedback(&owner, ticket, 4, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateAction);
}
