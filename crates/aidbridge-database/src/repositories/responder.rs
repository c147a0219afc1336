//! Responder repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::ResponderId;
use aidbridge_entity::responder::Responder;

use super::unique_or_database;
use crate::store::{NearbyResponder, ResponderStore};

/// Haversine distance in km from ($1, $2) to the row's coordinates.
const DISTANCE_SQL: &str = "2 * 6371.0088 * asin(sqrt(\
    power(sin(radians(latitude - $1) / 2), 2) + \
    cos(radians($1)) * cos(radians(latitude)) * power(sin(radians(longitude - $2) / 2), 2)))";

#[derive(Debug, FromRow)]
struct ResponderRow {
    id: Uuid,
    name: String,
    categories: Vec<String>,
    latitude: f64,
    longitude: f64,
    contact_email: Option<String>,
    points: i64,
    badges: Vec<String>,
    scored_entries: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct NearbyRow {
    #[sqlx(flatten)]
    responder: ResponderRow,
    distance_km: f64,
}

impl From<ResponderRow> for Responder {
    fn from(row: ResponderRow) -> Self {
        Self {
            id: ResponderId::from_uuid(row.id),
            name: row.name,
            categories: row.categories,
            location: GeoPoint::new(row.latitude, row.longitude),
            contact_email: row.contact_email,
            points: row.points,
            badges: row.badges,
            scored_entries: row.scored_entries,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for responder organizations.
#[derive(Debug, Clone)]
pub struct ResponderRepository {
    pool: PgPool,
}

impl ResponderRepository {
    /// Create a new responder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponderStore for ResponderRepository {
    async fn insert(&self, responder: &Responder) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO responders (id, name, categories, latitude, longitude, contact_email, \
             points, badges, scored_entries, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(responder.id)
        .bind(&responder.name)
        .bind(&responder.categories)
        .bind(responder.location.latitude)
        .bind(responder.location.longitude)
        .bind(&responder.contact_email)
        .bind(responder.points)
        .bind(&responder.badges)
        .bind(responder.scored_entries)
        .bind(responder.created_at)
        .bind(responder.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            unique_or_database(
                e,
                format!("Responder {} is already registered", responder.id),
                "Failed to create responder",
            )
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: ResponderId) -> AppResult<Option<Responder>> {
        let row = sqlx::query_as::<_, ResponderRow>("SELECT * FROM responders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find responder", e)
            })?;
        Ok(row.map(Responder::from))
    }

    async fn find_many(&self, ids: &[ResponderId]) -> AppResult<Vec<Responder>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let rows = sqlx::query_as::<_, ResponderRow>("SELECT * FROM responders WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load responders", e)
            })?;
        Ok(rows.into_iter().map(Responder::from).collect())
    }

    async fn nearest(
        &self,
        point: GeoPoint,
        limit: usize,
        category: Option<&str>,
    ) -> AppResult<Vec<NearbyResponder>> {
        let sql = format!(
            "SELECT *, {DISTANCE_SQL} AS distance_km FROM responders \
             WHERE ($3::text IS NULL OR $3 = ANY(categories)) \
             ORDER BY distance_km ASC, id LIMIT $4"
        );
        let rows = sqlx::query_as::<_, NearbyRow>(&sql)
            .bind(point.latitude)
            .bind(point.longitude)
            .bind(category.map(|c| c.trim().to_lowercase()))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to query nearest responders", e)
            })?;
        Ok(rows
            .into_iter()
            .map(|row| NearbyResponder {
                responder: row.responder.into(),
                distance_km: row.distance_km,
            })
            .collect())
    }

    async fn apply_score(
        &self,
        id: ResponderId,
        points: i64,
        entries: i64,
        badges: &[String],
    ) -> AppResult<Responder> {
        let row = sqlx::query_as::<_, ResponderRow>(
            "UPDATE responders SET \
             points = CASE WHEN $3 > scored_entries THEN $2 ELSE points END, \
             scored_entries = GREATEST(scored_entries, $3), \
             badges = badges || ARRAY(SELECT b FROM unnest($4::text[]) AS b WHERE NOT (b = ANY(badges))), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(points)
        .bind(entries)
        .bind(badges)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update score", e))?;
        row.map(Responder::from)
            .ok_or_else(|| AppError::not_found(format!("Responder {id} not found")))
    }
}
