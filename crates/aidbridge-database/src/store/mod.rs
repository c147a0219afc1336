//! Entity store traits.
//!
//! Plain persistence with referential fields and no business logic. Each
//! mutable record (ticket, pickup event) is updated with compare-and-swap on
//! its `version`: the caller passes the record as it read it, and the store
//! rejects the write with [`ErrorKind::Conflict`] if someone else got there
//! first. Inserts keyed by a natural pair report whether they created a row
//! so that dispatch can be retried safely.
//!
//! [`ErrorKind::Conflict`]: aidbridge_core::error::ErrorKind::Conflict

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use aidbridge_core::result::AppResult;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId, UserId};
use aidbridge_core::types::pagination::{PageRequest, PageResponse};
use aidbridge_entity::ledger::{ActorType, LedgerEntry, NewLedgerEntry};
use aidbridge_entity::need::Need;
use aidbridge_entity::notification::{InboxStatus, NotificationRecord};
use aidbridge_entity::pickup::PickupEvent;
use aidbridge_entity::responder::Responder;
use aidbridge_entity::ticket::HandlingTicket;

use crate::connection::DatabasePool;
use crate::repositories::{
    LedgerRepository, NeedRepository, NotificationRepository, PickupRepository,
    ResponderRepository, TicketRepository,
};

pub use memory::MemoryStore;

/// Needs and offers.
#[async_trait]
pub trait NeedStore: Send + Sync + std::fmt::Debug {
    /// Persist a new need.
    async fn insert(&self, need: &Need) -> AppResult<()>;

    /// Find a need by id.
    async fn find_by_id(&self, id: NeedId) -> AppResult<Option<Need>>;

    /// List a requester's needs, newest first.
    async fn find_by_requester(
        &self,
        requester_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Need>>;
}

/// A responder and its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyResponder {
    /// The responder.
    pub responder: Responder,
    /// Great-circle distance in kilometres.
    pub distance_km: f64,
}

/// Responder organizations.
#[async_trait]
pub trait ResponderStore: Send + Sync + std::fmt::Debug {
    /// Persist a new responder. Fails with `DuplicateAction` if the id exists.
    async fn insert(&self, responder: &Responder) -> AppResult<()>;

    /// Find a responder by id.
    async fn find_by_id(&self, id: ResponderId) -> AppResult<Option<Responder>>;

    /// Find every responder in `ids` that exists, in no particular order.
    async fn find_many(&self, ids: &[ResponderId]) -> AppResult<Vec<Responder>>;

    /// The `limit` responders closest to `point`, optionally restricted to
    /// those handling `category`. Ordered by ascending distance.
    async fn nearest(
        &self,
        point: GeoPoint,
        limit: usize,
        category: Option<&str>,
    ) -> AppResult<Vec<NearbyResponder>>;

    /// Add any badges not yet held and, if `entries` exceeds the entry count
    /// the stored points were derived from, overwrite the points. Atomic, so
    /// concurrent recomputes settle on the newest ledger snapshot.
    async fn apply_score(
        &self,
        id: ResponderId,
        points: i64,
        entries: i64,
        badges: &[String],
    ) -> AppResult<Responder>;
}

/// Handling tickets.
#[async_trait]
pub trait TicketStore: Send + Sync + std::fmt::Debug {
    /// Insert unless a ticket for the same (need, responder) exists.
    /// Returns whether a row was created.
    async fn insert_if_absent(&self, ticket: &HandlingTicket) -> AppResult<bool>;

    /// Find a ticket by id.
    async fn find_by_id(&self, id: TicketId) -> AppResult<Option<HandlingTicket>>;

    /// Find the ticket for a (need, responder) pair.
    async fn find_by_pair(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<Option<HandlingTicket>>;

    /// All tickets of a need, oldest first.
    async fn find_by_need(&self, need_id: NeedId) -> AppResult<Vec<HandlingTicket>>;

    /// Write `ticket` if the stored version still equals `ticket.version`.
    /// Returns the stored record with its bumped version.
    async fn update(&self, ticket: &HandlingTicket) -> AppResult<HandlingTicket>;
}

/// Unread counters for a responder's inbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnreadCounts {
    /// All unread records.
    pub unread: u64,
    /// Unread records flagged emergency.
    pub emergency_unread: u64,
}

/// Responder inbox records, keyed by (need, responder).
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug {
    /// Insert unless a record for the pair exists. Returns whether one was created.
    async fn insert_if_absent(&self, record: &NotificationRecord) -> AppResult<bool>;

    /// Find the record for a pair.
    async fn find(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<Option<NotificationRecord>>;

    /// Rewrite the status mirror for a pair.
    async fn set_status(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
        status: InboxStatus,
    ) -> AppResult<()>;

    /// A responder's records, emergency first, then newest first.
    async fn list_for_responder(
        &self,
        responder_id: ResponderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>>;

    /// Unread counters for a responder.
    async fn unread_counts(&self, responder_id: ResponderId) -> AppResult<UnreadCounts>;

    /// Mark one record read. Returns `false` if it was already read.
    async fn mark_read(&self, need_id: NeedId, responder_id: ResponderId) -> AppResult<bool>;

    /// Mark all of a responder's records read. Returns how many changed.
    async fn mark_all_read(&self, responder_id: ResponderId) -> AppResult<u64>;
}

/// Donation pickup events, one per ticket.
#[async_trait]
pub trait PickupStore: Send + Sync + std::fmt::Debug {
    /// Insert unless the ticket already has a pickup. Returns whether one was created.
    async fn insert_if_absent(&self, event: &PickupEvent) -> AppResult<bool>;

    /// Find the pickup for a ticket.
    async fn find_by_ticket(&self, ticket_id: TicketId) -> AppResult<Option<PickupEvent>>;

    /// Compare-and-swap update on `event.version`.
    async fn update(&self, event: &PickupEvent) -> AppResult<PickupEvent>;
}

/// The append-only activity ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug {
    /// Append one entry atomically.
    ///
    /// A ticket credits each actor type at most once: an entry whose
    /// `(ticket_id, actor_type)` is already on the ledger is not written and
    /// `None` is returned.
    async fn append(&self, entry: NewLedgerEntry) -> AppResult<Option<LedgerEntry>>;

    /// The entry crediting `actor_type` for a ticket, if any.
    async fn find_for_ticket(
        &self,
        ticket_id: TicketId,
        actor_type: ActorType,
    ) -> AppResult<Option<LedgerEntry>>;

    /// Every entry for an actor, oldest first.
    async fn entries_for(
        &self,
        actor_type: ActorType,
        actor_id: Uuid,
    ) -> AppResult<Vec<LedgerEntry>>;
}

/// The full set of stores the services depend on.
#[derive(Debug, Clone)]
pub struct Store {
    /// Needs and offers.
    pub needs: Arc<dyn NeedStore>,
    /// Responders.
    pub responders: Arc<dyn ResponderStore>,
    /// Tickets.
    pub tickets: Arc<dyn TicketStore>,
    /// Inbox records.
    pub notifications: Arc<dyn NotificationStore>,
    /// Pickup events.
    pub pickups: Arc<dyn PickupStore>,
    /// Activity ledger.
    pub ledger: Arc<dyn LedgerStore>,
    /// The pool behind the repositories; `None` for the in-memory backend.
    pub database: Option<DatabasePool>,
}

impl Store {
    /// Stores backed by a PostgreSQL pool.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            needs: Arc::new(NeedRepository::new(pool.clone())),
            responders: Arc::new(ResponderRepository::new(pool.clone())),
            tickets: Arc::new(TicketRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            pickups: Arc::new(PickupRepository::new(pool.clone())),
            ledger: Arc::new(LedgerRepository::new(pool)),
            database: Some(db),
        }
    }

    /// Process-local stores sharing one [`MemoryStore`].
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            needs: store.clone(),
            responders: store.clone(),
            tickets: store.clone(),
            notifications: store.clone(),
            pickups: store.clone(),
            ledger: store,
            database: None,
        }
    }

    /// Name of the backing storage, as reported by the health endpoint.
    pub fn backend(&self) -> &'static str {
        if self.database.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check that the backing storage answers. Always succeeds in memory.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.database {
            Some(db) => db.ping().await,
            None => Ok(()),
        }
    }

    /// Release database connections. A no-op in memory.
    pub async fn close(&self) {
        if let Some(db) = &self.database {
            db.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_always_healthy() {
        let store = Store::memory();
        assert_eq!(store.backend(), "memory");
        assert!(store.health_check().await.is_ok());
        store.close().await;
    }
}
