//! In-process implementation of every store trait.
//!
//! Used by tests and single-node deployments. State is lost on restart.
//! Keyed records live in `DashMap`s; tickets sit behind one `RwLock` so the
//! (need, responder) uniqueness check and the insert happen together.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use aidbridge_core::AppError;
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

use super::{
    LedgerStore, NearbyResponder, NeedStore, NotificationStore, PickupStore, ResponderStore,
    TicketStore, UnreadCounts,
};

#[derive(Debug, Default)]
struct TicketTable {
    by_id: HashMap<TicketId, HandlingTicket>,
    by_pair: HashMap<(NeedId, ResponderId), TicketId>,
}

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    needs: DashMap<NeedId, Need>,
    responders: DashMap<ResponderId, Responder>,
    tickets: RwLock<TicketTable>,
    notifications: DashMap<(NeedId, ResponderId), NotificationRecord>,
    pickups: DashMap<TicketId, PickupEvent>,
    ledger: Mutex<Vec<LedgerEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn version_conflict(
    what: &str,
    id: impl std::fmt::Display,
    expected: i64,
    actual: i64,
) -> AppError {
    AppError::conflict(format!(
        "{what} {id} was modified concurrently (expected version {expected}, found {actual})"
    ))
}

#[async_trait]
impl NeedStore for MemoryStore {
    async fn insert(&self, need: &Need) -> AppResult<()> {
        match self.needs.entry(need.id) {
            Entry::Occupied(_) => Err(AppError::duplicate_action(format!(
                "Need {} already exists",
                need.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(need.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: NeedId) -> AppResult<Option<Need>> {
        Ok(self.needs.get(&id).map(|n| n.value().clone()))
    }

    async fn find_by_requester(
        &self,
        requester_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Need>> {
        let mut needs: Vec<Need> = self
            .needs
            .iter()
            .filter(|n| n.requester_id == requester_id)
            .map(|n| n.value().clone())
            .collect();
        needs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(PageResponse::from_sorted(needs, page))
    }
}

#[async_trait]
impl ResponderStore for MemoryStore {
    async fn insert(&self, responder: &Responder) -> AppResult<()> {
        match self.responders.entry(responder.id) {
            Entry::Occupied(_) => Err(AppError::duplicate_action(format!(
                "Responder {} is already registered",
                responder.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(responder.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: ResponderId) -> AppResult<Option<Responder>> {
        Ok(self.responders.get(&id).map(|r| r.value().clone()))
    }

    async fn find_many(&self, ids: &[ResponderId]) -> AppResult<Vec<Responder>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.responders.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn nearest(
        &self,
        point: GeoPoint,
        limit: usize,
        category: Option<&str>,
    ) -> AppResult<Vec<NearbyResponder>> {
        let mut found: Vec<NearbyResponder> = self
            .responders
            .iter()
            .filter(|r| category.is_none_or(|c| r.handles(c)))
            .map(|r| NearbyResponder {
                distance_km: point.distance_km(&r.location),
                responder: r.value().clone(),
            })
            .collect();
        found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        found.truncate(limit);
        Ok(found)
    }

    async fn apply_score(
        &self,
        id: ResponderId,
        points: i64,
        entries: i64,
        badges: &[String],
    ) -> AppResult<Responder> {
        let mut responder = self
            .responders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Responder {id} not found")))?;
        responder.apply_score(points, entries, badges);
        Ok(responder.value().clone())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_if_absent(&self, ticket: &HandlingTicket) -> AppResult<bool> {
        let mut table = self.tickets.write().await;
        let pair = (ticket.need_id, ticket.responder_id);
        if table.by_pair.contains_key(&pair) {
            return Ok(false);
        }
        table.by_pair.insert(pair, ticket.id);
        table.by_id.insert(ticket.id, ticket.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: TicketId) -> AppResult<Option<HandlingTicket>> {
        Ok(self.tickets.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<Option<HandlingTicket>> {
        let table = self.tickets.read().await;
        Ok(table
            .by_pair
            .get(&(need_id, responder_id))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_need(&self, need_id: NeedId) -> AppResult<Vec<HandlingTicket>> {
        let table = self.tickets.read().await;
        let mut tickets: Vec<HandlingTicket> = table
            .by_id
            .values()
            .filter(|t| t.need_id == need_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tickets)
    }

    async fn update(&self, ticket: &HandlingTicket) -> AppResult<HandlingTicket> {
        let mut table = self.tickets.write().await;
        let stored = table
            .by_id
            .get_mut(&ticket.id)
            .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", ticket.id)))?;
        if stored.version != ticket.version {
            return Err(version_conflict(
                "Ticket",
                ticket.id,
                ticket.version,
                stored.version,
            ));
        }
        let mut next = ticket.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_if_absent(&self, record: &NotificationRecord) -> AppResult<bool> {
        match self
            .notifications
            .entry((record.need_id, record.responder_id))
        {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn find(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<Option<NotificationRecord>> {
        Ok(self
            .notifications
            .get(&(need_id, responder_id))
            .map(|r| r.value().clone()))
    }

    async fn set_status(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
        status: InboxStatus,
    ) -> AppResult<()> {
        let mut record = self
            .notifications
            .get_mut(&(need_id, responder_id))
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No inbox record for need {need_id} and responder {responder_id}"
                ))
            })?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn list_for_responder(
        &self,
        responder_id: ResponderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        let mut records: Vec<NotificationRecord> = self
            .notifications
            .iter()
            .filter(|r| r.responder_id == responder_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| {
            b.emergency
                .cmp(&a.emergency)
                .then(b.notified_at.cmp(&a.notified_at))
                .then(a.need_id.cmp(&b.need_id))
        });
        Ok(PageResponse::from_sorted(records, page))
    }

    async fn unread_counts(&self, responder_id: ResponderId) -> AppResult<UnreadCounts> {
        Ok(self
            .notifications
            .iter()
            .filter(|r| r.responder_id == responder_id && !r.read)
            .fold(UnreadCounts::default(), |mut acc, r| {
                acc.unread += 1;
                if r.emergency {
                    acc.emergency_unread += 1;
                }
                acc
            }))
    }

    async fn mark_read(&self, need_id: NeedId, responder_id: ResponderId) -> AppResult<bool> {
        let mut record = self
            .notifications
            .get_mut(&(need_id, responder_id))
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No inbox record for need {need_id} and responder {responder_id}"
                ))
            })?;
        Ok(record.mark_read())
    }

    async fn mark_all_read(&self, responder_id: ResponderId) -> AppResult<u64> {
        let mut changed = 0;
        for mut record in self.notifications.iter_mut() {
            if record.responder_id == responder_id && record.mark_read() {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl PickupStore for MemoryStore {
    async fn insert_if_absent(&self, event: &PickupEvent) -> AppResult<bool> {
        match self.pickups.entry(event.ticket_id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(event.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_ticket(&self, ticket_id: TicketId) -> AppResult<Option<PickupEvent>> {
        Ok(self.pickups.get(&ticket_id).map(|p| p.value().clone()))
    }

    async fn update(&self, event: &PickupEvent) -> AppResult<PickupEvent> {
        let mut stored = self.pickups.get_mut(&event.ticket_id).ok_or_else(|| {
            AppError::not_found(format!("No pickup for ticket {}", event.ticket_id))
        })?;
        if stored.version != event.version {
            return Err(version_conflict(
                "Pickup",
                event.id,
                event.version,
                stored.version,
            ));
        }
        let mut next = event.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append(&self, entry: NewLedgerEntry) -> AppResult<Option<LedgerEntry>> {
        let entry = entry.into_entry();
        let mut ledger = self.ledger.lock().await;
        if entry.ticket_id.is_some()
            && ledger
                .iter()
                .any(|e| e.ticket_id == entry.ticket_id && e.actor_type == entry.actor_type)
        {
            return Ok(None);
        }
        ledger.push(entry.clone());
        Ok(Some(entry))
    }

    async fn find_for_ticket(
        &self,
        ticket_id: TicketId,
        actor_type: ActorType,
    ) -> AppResult<Option<LedgerEntry>> {
        Ok(self
            .ledger
            .lock()
            .await
            .iter()
            .find(|e| e.ticket_id == Some(ticket_id) && e.actor_type == actor_type)
            .cloned())
    }

    async fn entries_for(
        &self,
        actor_type: ActorType,
        actor_id: Uuid,
    ) -> AppResult<Vec<LedgerEntry>> {
        Ok(self
            .ledger
            .lock()
            .await
            .iter()
            .filter(|e| e.actor_type == actor_type && e.actor_id == actor_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidbridge_core::error::ErrorKind;
    use aidbridge_entity::responder::CreateResponder;
    use aidbridge_entity::ticket::TicketStatus;

    fn responder(name: &str, lat: f64, lon: f64, categories: &[&str]) -> Responder {
        Responder::new(
            ResponderId::new(),
            CreateResponder {
                name: name.into(),
                categories: categories.iter().map(|c| c.to_string()).collect(),
                location: GeoPoint::new(lat, lon),
                contact_email: None,
            },
        )
    }

    #[tokio::test]
    async fn test_ticket_pair_is_unique() {
        let store = MemoryStore::new();
        let (need, resp) = (NeedId::new(), ResponderId::new());
        let first = HandlingTicket::new(need, resp);
        let second = HandlingTicket::new(need, resp);
        assert!(TicketStore::insert_if_absent(&store, &first).await.unwrap());
        assert!(!TicketStore::insert_if_absent(&store, &second).await.unwrap());
        assert_eq!(TicketStore::find_by_need(&store, need).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ticket_update_is_compare_and_swap() {
        let store = MemoryStore::new();
        let ticket = HandlingTicket::new(NeedId::new(), ResponderId::new());
        TicketStore::insert_if_absent(&store, &ticket).await.unwrap();

        let mut first = ticket.clone();
        first.accept().unwrap();
        let saved = TicketStore::update(&store, &first).await.unwrap();
        assert_eq!(saved.version, 1);

        let mut stale = ticket.clone();
        stale.reject().unwrap();
        let err = TicketStore::update(&store, &stale).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let stored = TicketStore::find_by_id(&store, ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Accepted);
    }

    #[tokio::test]
    async fn test_nearest_orders_and_filters() {
        let store = MemoryStore::new();
        let near = responder("Near", 19.08, 72.88, &["food"]);
        let far = responder("Far", 18.52, 73.85, &["food"]);
        let other = responder("Other", 19.07, 72.87, &["medicine"]);
        for r in [&near, &far, &other] {
            ResponderStore::insert(&store, r).await.unwrap();
        }

        let found = store
            .nearest(GeoPoint::new(19.076, 72.8777), 5, Some("food"))
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|n| n.responder.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far"]);

        let one = store.nearest(GeoPoint::new(19.076, 72.8777), 1, None).await.unwrap();
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_responder_rejected() {
        let store = MemoryStore::new();
        let r = responder("NGO", 0.0, 0.0, &[]);
        ResponderStore::insert(&store, &r).await.unwrap();
        let err = ResponderStore::insert(&store, &r).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateAction);
    }

    #[tokio::test]
    async fn test_inbox_ordering_and_counts() {
        let store = MemoryStore::new();
        let resp = ResponderId::new();
        let calm = NotificationRecord::new(NeedId::new(), resp, TicketId::new(), false);
        let urgent = NotificationRecord::new(NeedId::new(), resp, TicketId::new(), true);
        NotificationStore::insert_if_absent(&store, &calm).await.unwrap();
        NotificationStore::insert_if_absent(&store, &urgent).await.unwrap();

        let page = store
            .list_for_responder(resp, &PageRequest::default())
            .await
            .unwrap();
        assert!(page.items[0].emergency);

        let counts = store.unread_counts(resp).await.unwrap();
        assert_eq!(counts, UnreadCounts { unread: 2, emergency_unread: 1 });

        assert!(store.mark_read(urgent.need_id, resp).await.unwrap());
        assert_eq!(store.mark_all_read(resp).await.unwrap(), 1);
        assert_eq!(store.unread_counts(resp).await.unwrap().unread, 0);
    }

    #[tokio::test]
    async fn test_ledger_filters_by_actor() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        for delta in [120, 120, 120] {
            store
                .append(NewLedgerEntry {
                    actor_type: ActorType::Responder,
                    actor_id: actor,
                    description: "Ticket completed".into(),
                    points_delta: delta,
                    ticket_id: None,
                })
                .await
                .unwrap();
        }
        let entries = store.entries_for(ActorType::Responder, actor).await.unwrap();
        assert_eq!(entries.iter().map(|e| e.points_delta).sum::<i64>(), 360);
        assert!(
            store
                .entries_for(ActorType::Requester, actor)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_ticket_credits_each_actor_type_once() {
        let store = MemoryStore::new();
        let ticket = TicketId::new();
        let entry = |actor_type| NewLedgerEntry {
            actor_type,
            actor_id: Uuid::new_v4(),
            description: "Completed".into(),
            points_delta: 100,
            ticket_id: Some(ticket),
        };

        assert!(store.append(entry(ActorType::Responder)).await.unwrap().is_some());
        assert!(store.append(entry(ActorType::Responder)).await.unwrap().is_none());
        assert!(store.append(entry(ActorType::Requester)).await.unwrap().is_some());

        let found = store
            .find_for_ticket(ticket, ActorType::Responder)
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(
            store
                .find_for_ticket(TicketId::new(), ActorType::Responder)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_stale_score_keeps_newer_points() {
        let store = MemoryStore::new();
        let r = responder("NGO", 0.0, 0.0, &[]);
        ResponderStore::insert(&store, &r).await.unwrap();

        store.apply_score(r.id, 200, 2, &["Bronze".into()]).await.unwrap();
        let updated = store.apply_score(r.id, 100, 1, &[]).await.unwrap();
        assert_eq!(updated.points, 200);
        assert_eq!(updated.badges, vec!["Bronze"]);
    }
}
