//! Need repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{NeedId, UserId};
use aidbridge_core::types::pagination::{PageRequest, PageResponse};
use aidbridge_entity::need::{AggregateStatus, Need, NeedKind};

use super::unique_or_database;
use crate::store::NeedStore;

#[derive(Debug, FromRow)]
struct NeedRow {
    id: Uuid,
    kind: NeedKind,
    category: String,
    description: String,
    latitude: f64,
    longitude: f64,
    address: Option<String>,
    drop_latitude: Option<f64>,
    drop_longitude: Option<f64>,
    emergency: bool,
    requester_id: Uuid,
    base_status: AggregateStatus,
    created_at: DateTime<Utc>,
}

impl From<NeedRow> for Need {
    fn from(row: NeedRow) -> Self {
        let drop_location = match (row.drop_latitude, row.drop_longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        Self {
            id: NeedId::from_uuid(row.id),
            kind: row.kind,
            category: row.category,
            description: row.description,
            location: GeoPoint::new(row.latitude, row.longitude),
            address: row.address,
            drop_location,
            emergency: row.emergency,
            requester_id: UserId::from_uuid(row.requester_id),
            base_status: row.base_status,
            created_at: row.created_at,
        }
    }
}

/// Repository for needs and offers.
#[derive(Debug, Clone)]
pub struct NeedRepository {
    pool: PgPool,
}

impl NeedRepository {
    /// Create a new need repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NeedStore for NeedRepository {
    async fn insert(&self, need: &Need) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO needs (id, kind, category, description, latitude, longitude, address, \
             drop_latitude, drop_longitude, emergency, requester_id, base_status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(need.id)
        .bind(need.kind)
        .bind(&need.category)
        .bind(&need.description)
        .bind(need.location.latitude)
        .bind(need.location.longitude)
        .bind(&need.address)
        .bind(need.drop_location.map(|p| p.latitude))
        .bind(need.drop_location.map(|p| p.longitude))
        .bind(need.emergency)
        .bind(need.requester_id)
        .bind(need.base_status)
        .bind(need.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            unique_or_database(
                e,
                format!("Need {} already exists", need.id),
                "Failed to create need",
            )
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: NeedId) -> AppResult<Option<Need>> {
        let row = sqlx::query_as::<_, NeedRow>("SELECT * FROM needs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find need", e))?;
        Ok(row.map(Need::from))
    }

    async fn find_by_requester(
        &self,
        requester_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Need>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM needs WHERE requester_id = $1")
            .bind(requester_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count needs", e))?;

        let rows = sqlx::query_as::<_, NeedRow>(
            "SELECT * FROM needs WHERE requester_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
        )
        .bind(requester_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list needs", e))?;

        Ok(PageResponse::new(
            rows.into_iter().map(Need::from).collect(),
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
