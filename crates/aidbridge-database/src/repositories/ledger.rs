//! Activity ledger repository implementation.
//!
//! Insert-only: there is no update or delete statement for this table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::{LedgerEntryId, TicketId};
use aidbridge_entity::ledger::{ActorType, LedgerEntry, NewLedgerEntry};

use crate::store::LedgerStore;

#[derive(Debug, FromRow)]
struct LedgerRow {
    id: Uuid,
    actor_type: ActorType,
    actor_id: Uuid,
    description: String,
    points_delta: i64,
    ticket_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<LedgerRow> for LedgerEntry {
    fn from(row: LedgerRow) -> Self {
        Self {
            id: LedgerEntryId::from_uuid(row.id),
            actor_type: row.actor_type,
            actor_id: row.actor_id,
            description: row.description,
            points_delta: row.points_delta,
            ticket_id: row.ticket_id.map(TicketId::from_uuid),
            created_at: row.created_at,
        }
    }
}

/// Repository for ledger appends and reads.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Create a new ledger repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn append(&self, entry: NewLedgerEntry) -> AppResult<Option<LedgerEntry>> {
        let entry = entry.into_entry();
        let result = sqlx::query(
            "INSERT INTO activity_ledger (id, actor_type, actor_id, description, points_delta, \
             ticket_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (ticket_id, actor_type) WHERE ticket_id IS NOT NULL DO NOTHING",
        )
        .bind(entry.id)
        .bind(entry.actor_type)
        .bind(entry.actor_id)
        .bind(&entry.description)
        .bind(entry.points_delta)
        .bind(entry.ticket_id)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append ledger entry", e))?;
        Ok((result.rows_affected() > 0).then_some(entry))
    }

    async fn find_for_ticket(
        &self,
        ticket_id: TicketId,
        actor_type: ActorType,
    ) -> AppResult<Option<LedgerEntry>> {
        let row = sqlx::query_as::<_, LedgerRow>(
            "SELECT * FROM activity_ledger WHERE ticket_id = $1 AND actor_type = $2",
        )
        .bind(ticket_id)
        .bind(actor_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read ledger", e))?;
        Ok(row.map(LedgerEntry::from))
    }

    async fn entries_for(
        &self,
        actor_type: ActorType,
        actor_id: Uuid,
    ) -> AppResult<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            "SELECT * FROM activity_ledger WHERE actor_type = $1 AND actor_id = $2 \
             ORDER BY created_at, id",
        )
        .bind(actor_type)
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read ledger", e))?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }
}
