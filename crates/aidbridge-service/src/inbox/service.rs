//! Read side of the notification records and the read flag.

use tracing::{debug, info};

use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::NeedId;
use aidbridge_core::types::pagination::{PageRequest, PageResponse};
use aidbridge_database::Store;
use aidbridge_database::store::UnreadCounts;
use aidbridge_entity::notification::NotificationRecord;

use crate::context::RequestContext;

/// Lists and marks the calling responder's own inbox records.
#[derive(Debug, Clone)]
pub struct InboxService {
    store: Store,
}

impl InboxService {
    /// Creates a new inbox service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Own records, emergency first, then newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        let responder_id = ctx.require_responder()?;
        self.store
            .notifications
            .list_for_responder(responder_id, page)
            .await
    }

    /// Unread and emergency-unread counters.
    pub async fn unread_counts(&self, ctx: &RequestContext) -> AppResult<UnreadCounts> {
        let responder_id = ctx.require_responder()?;
        self.store.notifications.unread_counts(responder_id).await
    }

    /// Mark the record for one need read. Returns whether it changed.
    pub async fn mark_read(&self, ctx: &RequestContext, need_id: NeedId) -> AppResult<bool> {
        let responder_id = ctx.require_responder()?;
        let changed = self
            .store
            .notifications
            .mark_read(need_id, responder_id)
            .await?;
        debug!(need_id = %need_id, responder_id = %responder_id, changed, "Inbox record read");
        Ok(changed)
    }

    /// Mark every own record read. Returns how many changed.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let responder_id = ctx.require_responder()?;
        let changed = self.store.notifications.mark_all_read(responder_id).await?;
        info!(responder_id = %responder_id, changed, "Inbox marked read");
        Ok(changed)
    }
}
