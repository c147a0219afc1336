//! Notification record repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};
use aidbridge_core::types::pagination::{PageRequest, PageResponse};
use aidbridge_entity::notification::{InboxStatus, NotificationRecord};

use crate::store::{NotificationStore, UnreadCounts};

#[derive(Debug, FromRow)]
struct NotificationRow {
    need_id: Uuid,
    responder_id: Uuid,
    ticket_id: Uuid,
    notified_at: DateTime<Utc>,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    emergency: bool,
    status: InboxStatus,
    updated_at: DateTime<Utc>,
}

impl From<NotificationRow> for NotificationRecord {
    fn from(row: NotificationRow) -> Self {
        Self {
            need_id: NeedId::from_uuid(row.need_id),
            responder_id: ResponderId::from_uuid(row.responder_id),
            ticket_id: TicketId::from_uuid(row.ticket_id),
            notified_at: row.notified_at,
            read: row.read,
            read_at: row.read_at,
            emergency: row.emergency,
            status: row.status,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for responder inbox records.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert_if_absent(&self, record: &NotificationRecord) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO notification_records (need_id, responder_id, ticket_id, notified_at, \
             read, read_at, emergency, status, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (need_id, responder_id) DO NOTHING",
        )
        .bind(record.need_id)
        .bind(record.responder_id)
        .bind(record.ticket_id)
        .bind(record.notified_at)
        .bind(record.read)
        .bind(record.read_at)
        .bind(record.emergency)
        .bind(record.status)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification record", e)
        })?;
        Ok(result.rows_affected() == 1)
    }

    async fn find(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<Option<NotificationRecord>> {
        let row = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notification_records WHERE need_id = $1 AND responder_id = $2",
        )
        .bind(need_id)
        .bind(responder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find notification record", e)
        })?;
        Ok(row.map(NotificationRecord::from))
    }

    async fn set_status(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
        status: InboxStatus,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notification_records SET status = $3, updated_at = NOW() \
             WHERE need_id = $1 AND responder_id = $2",
        )
        .bind(need_id)
        .bind(responder_id)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update inbox status", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "No inbox record for need {need_id} and responder {responder_id}"
            )));
        }
        Ok(())
    }

    async fn list_for_responder(
        &self,
        responder_id: ResponderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationRecord>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notification_records WHERE responder_id = $1")
                .bind(responder_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count inbox", e)
                })?;

        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notification_records WHERE responder_id = $1 \
             ORDER BY emergency DESC, notified_at DESC, need_id LIMIT $2 OFFSET $3",
        )
        .bind(responder_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list inbox", e))?;

        Ok(PageResponse::new(
            rows.into_iter().map(NotificationRecord::from).collect(),
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn unread_counts(&self, responder_id: ResponderId) -> AppResult<UnreadCounts> {
        let (unread, emergency_unread): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE emergency) FROM notification_records \
             WHERE responder_id = $1 AND read = FALSE",
        )
        .bind(responder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(UnreadCounts {
            unread: unread as u64,
            emergency_unread: emergency_unread as u64,
        })
    }

    async fn mark_read(&self, need_id: NeedId, responder_id: ResponderId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notification_records SET read = TRUE, read_at = NOW(), updated_at = NOW() \
             WHERE need_id = $1 AND responder_id = $2 AND read = FALSE",
        )
        .bind(need_id)
        .bind(responder_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.find(need_id, responder_id).await? {
            Some(_) => Ok(false),
            None => Err(AppError::not_found(format!(
                "No inbox record for need {need_id} and responder {responder_id}"
            ))),
        }
    }

    async fn mark_all_read(&self, responder_id: ResponderId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_records SET read = TRUE, read_at = NOW(), updated_at = NOW() \
             WHERE responder_id = $1 AND read = FALSE",
        )
        .bind(responder_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }
}
