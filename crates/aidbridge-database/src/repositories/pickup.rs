//! Pickup event repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{PickupEventId, TicketId};
use aidbridge_entity::pickup::{PickupEvent, PickupStatus};

use crate::store::PickupStore;

#[derive(Debug, FromRow)]
struct PickupRow {
    id: Uuid,
    ticket_id: Uuid,
    pickup_latitude: f64,
    pickup_longitude: f64,
    drop_latitude: f64,
    drop_longitude: f64,
    status: PickupStatus,
    scheduled_at: DateTime<Utc>,
    picked_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    proof_images: Vec<String>,
    delivery_notes: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PickupRow> for PickupEvent {
    fn from(row: PickupRow) -> Self {
        Self {
            id: PickupEventId::from_uuid(row.id),
            ticket_id: TicketId::from_uuid(row.ticket_id),
            pickup_location: GeoPoint::new(row.pickup_latitude, row.pickup_longitude),
            drop_location: GeoPoint::new(row.drop_latitude, row.drop_longitude),
            status: row.status,
            scheduled_at: row.scheduled_at,
            picked_at: row.picked_at,
            delivered_at: row.delivered_at,
            proof_images: row.proof_images,
            delivery_notes: row.delivery_notes,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for donation pickup events.
#[derive(Debug, Clone)]
pub struct PickupRepository {
    pool: PgPool,
}

impl PickupRepository {
    /// Create a new pickup repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PickupStore for PickupRepository {
    async fn insert_if_absent(&self, event: &PickupEvent) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO pickup_events (id, ticket_id, pickup_latitude, pickup_longitude, \
             drop_latitude, drop_longitude, status, scheduled_at, proof_images, version, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (ticket_id) DO NOTHING",
        )
        .bind(event.id)
        .bind(event.ticket_id)
        .bind(event.pickup_location.latitude)
        .bind(event.pickup_location.longitude)
        .bind(event.drop_location.latitude)
        .bind(event.drop_location.longitude)
        .bind(event.status)
        .bind(event.scheduled_at)
        .bind(&event.proof_images)
        .bind(event.version)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create pickup", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_ticket(&self, ticket_id: TicketId) -> AppResult<Option<PickupEvent>> {
        let row = sqlx::query_as::<_, PickupRow>("SELECT * FROM pickup_events WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find pickup", e))?;
        Ok(row.map(PickupEvent::from))
    }

    async fn update(&self, event: &PickupEvent) -> AppResult<PickupEvent> {
        let row = sqlx::query_as::<_, PickupRow>(
            "UPDATE pickup_events SET status = $3, scheduled_at = $4, picked_at = $5, \
             delivered_at = $6, proof_images = $7, delivery_notes = $8, \
             version = version + 1, updated_at = $9 \
             WHERE ticket_id = $1 AND version = $2 RETURNING *",
        )
        .bind(event.ticket_id)
        .bind(event.version)
        .bind(event.status)
        .bind(event.scheduled_at)
        .bind(event.picked_at)
        .bind(event.delivered_at)
        .bind(&event.proof_images)
        .bind(&event.delivery_notes)
        .bind(event.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update pickup", e))?;

        row.map(PickupEvent::from).ok_or_else(|| {
            AppError::conflict(format!(
                "Pickup {} was modified concurrently or no longer exists",
                event.id
            ))
        })
    }
}
