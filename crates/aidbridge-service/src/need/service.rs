//! Need registration and read-side aggregation.

use serde::Serialize;
use tracing::info;

use aidbridge_core::AppError;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::NeedId;
use aidbridge_core::types::pagination::{PageRequest, PageResponse};
use aidbridge_database::Store;
use aidbridge_entity::need::{AggregateStatus, CreateNeed, Need};
use aidbridge_entity::ticket::HandlingTicket;

use crate::context::RequestContext;
use crate::lookup;

/// A need with its derived status and the tickets visible to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct NeedView {
    /// The need.
    pub need: Need,
    /// Aggregate status derived from all tickets.
    pub status: AggregateStatus,
    /// The requester sees every ticket; a responder sees its own.
    pub tickets: Vec<HandlingTicket>,
}

/// A need and its derived status, for list views.
#[derive(Debug, Clone, Serialize)]
pub struct NeedSummary {
    /// The need.
    pub need: Need,
    /// Aggregate status derived from all tickets.
    pub status: AggregateStatus,
    /// Number of dispatched tickets.
    pub ticket_count: usize,
}

/// Registers needs and offers and derives their aggregate status on read.
#[derive(Debug, Clone)]
pub struct NeedService {
    store: Store,
}

impl NeedService {
    /// Creates a new need service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a need or donation offer for the calling requester.
    pub async fn create_need(&self, ctx: &RequestContext, input: CreateNeed) -> AppResult<Need> {
        let requester_id = ctx.require_requester()?;
        input.validate()?;

        let need = Need::new(input, requester_id);
        self.store.needs.insert(&need).await?;

        info!(
            need_id = %need.id,
            requester_id = %requester_id,
            kind = %need.kind,
            category = %need.category,
            emergency = need.emergency,
            "Need created"
        );

        Ok(need)
    }

    /// Fetch a need with its current aggregate status.
    pub async fn get_need(&self, ctx: &RequestContext, need_id: NeedId) -> AppResult<NeedView> {
        let need = lookup::need(&self.store, need_id).await?;
        let tickets = self.store.tickets.find_by_need(need_id).await?;
        let status = Self::aggregate(&need, &tickets);

        let visible = if ctx.is_requester(need.requester_id) {
            tickets
        } else {
            let own: Vec<HandlingTicket> = tickets
                .into_iter()
                .filter(|t| ctx.is_responder(t.responder_id))
                .collect();
            if own.is_empty() {
                return Err(AppError::authorization(format!(
                    "Not entitled to view need {need_id}"
                )));
            }
            own
        };

        Ok(NeedView {
            need,
            status,
            tickets: visible,
        })
    }

    /// The calling requester's needs, newest first.
    pub async fn list_my_needs(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NeedSummary>> {
        let requester_id = ctx.require_requester()?;
        let needs = self.store.needs.find_by_requester(requester_id, page).await?;

        let mut items = Vec::with_capacity(needs.items.len());
        for need in needs.items {
            let tickets = self.store.tickets.find_by_need(need.id).await?;
            items.push(NeedSummary {
                status: Self::aggregate(&need, &tickets),
                ticket_count: tickets.len(),
                need,
            });
        }

        Ok(PageResponse::new(
            items,
            needs.page,
            needs.page_size,
            needs.total_items,
        ))
    }

    /// Aggregate status of a need over the given tickets.
    pub fn aggregate(need: &Need, tickets: &[HandlingTicket]) -> AggregateStatus {
        AggregateStatus::reduce(
            need.emergency,
            need.base_status,
            tickets.iter().map(|t| t.status),
        )
    }
}
