//! Scoring engine.
//!
//! Points are the sum of an actor's ledger deltas and badges are every tier
//! at or below that sum. Nothing is cached: each call re-reads the ledger,
//! so recomputing is idempotent and safe to run on demand. Ticket credits
//! are keyed by (ticket, actor type), so crediting the same ticket again
//! appends nothing.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use aidbridge_core::config::ScoringConfig;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::{ResponderId, TicketId, UserId};
use aidbridge_database::Store;
use aidbridge_entity::badge::{BadgeTable, BadgeTier};
use aidbridge_entity::ledger::{ActorType, LedgerEntry, NewLedgerEntry};

/// Derived score for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Kind of actor.
    pub actor_type: ActorType,
    /// Actor id.
    pub actor_id: Uuid,
    /// Sum of ledger deltas.
    pub points: i64,
    /// Tiers at or below `points`, ascending.
    pub badges: Vec<String>,
    /// The next tier to unlock, if any.
    pub next_badge: Option<BadgeTier>,
    /// Number of ledger entries considered.
    pub entries: usize,
}

/// Appends ledger entries and derives scores from them.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    store: Store,
    table: BadgeTable,
    completion_points: i64,
    feedback_points: i64,
}

impl ScoringEngine {
    /// Creates a scoring engine from configuration.
    pub fn new(store: Store, config: &ScoringConfig) -> Self {
        Self {
            store,
            table: BadgeTable::from_config(&config.badge_tiers),
            completion_points: config.completion_points,
            feedback_points: config.feedback_points,
        }
    }

    /// The badge tier table.
    pub fn badge_table(&self) -> &BadgeTable {
        &self.table
    }

    /// Pure reduction of ledger entries into a score.
    pub fn compute(
        table: &BadgeTable,
        actor_type: ActorType,
        actor_id: Uuid,
        entries: &[LedgerEntry],
    ) -> Score {
        let points = entries.iter().map(|e| e.points_delta).sum();
        Score {
            actor_type,
            actor_id,
            points,
            badges: table.earned_names(points),
            next_badge: table.next_tier(points).cloned(),
            entries: entries.len(),
        }
    }

    /// Read-only score for an actor.
    pub async fn score_for(&self, actor_type: ActorType, actor_id: Uuid) -> AppResult<Score> {
        let entries = self.store.ledger.entries_for(actor_type, actor_id).await?;
        Ok(Self::compute(&self.table, actor_type, actor_id, &entries))
    }

    /// Recompute an actor's score and refresh the responder projection.
    pub async fn recompute(&self, actor_type: ActorType, actor_id: Uuid) -> AppResult<Score> {
        let score = self.score_for(actor_type, actor_id).await?;
        if actor_type == ActorType::Responder {
            self.store
                .responders
                .apply_score(
                    ResponderId::from_uuid(actor_id),
                    score.points,
                    i64::try_from(score.entries).unwrap_or(i64::MAX),
                    &score.badges,
                )
                .await?;
        }
        Ok(score)
    }

    /// Append one entry, then recompute the credited actor.
    ///
    /// An entry for a ticket that already credited this actor type is
    /// skipped; the recompute still runs.
    pub async fn credit(&self, entry: NewLedgerEntry) -> AppResult<Score> {
        let (actor_type, actor_id, ticket_id) = (entry.actor_type, entry.actor_id, entry.ticket_id);
        let appended = self.store.ledger.append(entry).await?;
        let score = self.recompute(actor_type, actor_id).await?;

        match appended {
            Some(entry) => info!(
                actor_type = %actor_type,
                actor_id = %actor_id,
                entry_id = %entry.id,
                delta = entry.points_delta,
                points = score.points,
                badges = ?score.badges,
                "Ledger entry appended"
            ),
            None => debug!(
                actor_type = %actor_type,
                actor_id = %actor_id,
                ticket_id = ?ticket_id,
                "Ticket already credited"
            ),
        }

        Ok(score)
    }

    /// Whether the ticket has already credited `actor_type`.
    pub async fn is_credited(&self, ticket_id: TicketId, actor_type: ActorType) -> AppResult<bool> {
        Ok(self
            .store
            .ledger
            .find_for_ticket(ticket_id, actor_type)
            .await?
            .is_some())
    }

    /// Credit a responder for a completed ticket.
    pub async fn credit_completion(
        &self,
        responder_id: ResponderId,
        ticket_id: TicketId,
    ) -> AppResult<Score> {
        self.credit(NewLedgerEntry {
            actor_type: ActorType::Responder,
            actor_id: responder_id.into_uuid(),
            description: format!("Completed ticket {ticket_id}"),
            points_delta: self.completion_points,
            ticket_id: Some(ticket_id),
        })
        .await
    }

    /// Credit a requester for leaving feedback.
    pub async fn credit_feedback(
        &self,
        requester_id: UserId,
        ticket_id: TicketId,
    ) -> AppResult<Score> {
        self.credit(NewLedgerEntry {
            actor_type: ActorType::Requester,
            actor_id: requester_id.into_uuid(),
            description: format!("Feedback on ticket {ticket_id}"),
            points_delta: self.feedback_points,
            ticket_id: Some(ticket_id),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidbridge_core::types::geo::GeoPoint;
    use aidbridge_entity::responder::{CreateResponder, Responder};

    fn config(completion_points: i64) -> ScoringConfig {
        ScoringConfig {
            completion_points,
            ..ScoringConfig::default()
        }
    }

    async fn registered(store: &Store) -> ResponderId {
        let id = ResponderId::new();
        let responder = Responder::new(
            id,
            CreateResponder {
                name: "Food Bank".into(),
                categories: vec!["food".into()],
                location: GeoPoint::new(19.0, 72.8),
                contact_email: None,
            },
        );
        store.responders.insert(&responder).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_three_completions_at_120_reach_silver() {
        let store = Store::memory();
        let engine = ScoringEngine::new(store.clone(), &config(120));
        let responder = registered(&store).await;

        for _ in 0..3 {
            engine
                .credit_completion(responder, TicketId::new())
                .await
                .unwrap();
        }

        let score = engine
            .score_for(ActorType::Responder, responder.into_uuid())
            .await
            .unwrap();
        assert_eq!(score.points, 360);
        assert_eq!(score.badges, vec!["Bronze", "Silver"]);
        assert_eq!(score.next_badge.map(|t| t.name), Some("Gold".to_string()));

        let record = store.responders.find_by_id(responder).await.unwrap().unwrap();
        assert_eq!(record.points, 360);
        assert_eq!(record.badges, vec!["Bronze", "Silver"]);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let store = Store::memory();
        let engine = ScoringEngine::new(store.clone(), &config(120));
        let responder = registered(&store).await;
        engine.credit_completion(responder, TicketId::new()).await.unwrap();

        let first = engine
            .recompute(ActorType::Responder, responder.into_uuid())
            .await
            .unwrap();
        let second = engine
            .recompute(ActorType::Responder, responder.into_uuid())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_negative_delta_drops_points_but_not_held_badges() {
        let store = Store::memory();
        let engine = ScoringEngine::new(store.clone(), &config(120));
        let responder = registered(&store).await;
        engine.credit_completion(responder, TicketId::new()).await.unwrap();

        let score = engine
            .credit(NewLedgerEntry {
                actor_type: ActorType::Responder,
                actor_id: responder.into_uuid(),
                description: "Adjustment".into(),
                points_delta: -50,
                ticket_id: None,
            })
            .await
            .unwrap();
        assert_eq!(score.points, 70);
        assert!(score.badges.is_empty());

        let record = store.responders.find_by_id(responder).await.unwrap().unwrap();
        assert_eq!(record.badges, vec!["Bronze"]);
    }

    #[tokio::test]
    async fn test_same_ticket_credits_once() {
        let store = Store::memory();
        let engine = ScoringEngine::new(store.clone(), &config(120));
        let responder = registered(&store).await;
        let ticket = TicketId::new();

        engine.credit_completion(responder, ticket).await.unwrap();
        let again = engine.credit_completion(responder, ticket).await.unwrap();
        assert_eq!(again.points, 120);
        assert_eq!(again.entries, 1);
        assert!(
            engine
                .is_credited(ticket, ActorType::Responder)
                .await
                .unwrap()
        );
        assert!(
            !engine
                .is_credited(ticket, ActorType::Requester)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_requester_feedback_credit() {
        let store = Store::memory();
        let engine = ScoringEngine::new(store, &ScoringConfig::default());
        let requester = UserId::new();
        let score = engine
            .credit_feedback(requester, TicketId::new())
            .await
            .unwrap();
        assert_eq!(score.points, 10);
        assert_eq!(score.actor_type, ActorType::Requester);
    }
}
