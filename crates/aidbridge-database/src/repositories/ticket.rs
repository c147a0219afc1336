//! Ticket repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};
use aidbridge_entity::ticket::{Feedback, HandlingTicket, SchedulingDetail, TicketStatus};

use crate::store::TicketStore;

#[derive(Debug, FromRow)]
struct TicketRow {
    id: Uuid,
    need_id: Uuid,
    responder_id: Uuid,
    status: TicketStatus,
    volunteer_name: Option<String>,
    volunteer_contact: Option<String>,
    scheduled_date: Option<NaiveDate>,
    scheduled_time: Option<NaiveTime>,
    requester_confirmed: bool,
    confirmed_at: Option<DateTime<Utc>>,
    feedback_rating: Option<i16>,
    feedback_comment: Option<String>,
    feedback_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for HandlingTicket {
    type Error = AppError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let scheduling = match (
            row.volunteer_name,
            row.volunteer_contact,
            row.scheduled_date,
            row.scheduled_time,
        ) {
            (Some(volunteer_name), Some(volunteer_contact), Some(date), Some(time)) => {
                Some(SchedulingDetail {
                    volunteer_name,
                    volunteer_contact,
                    date,
                    time,
                })
            }
            _ => None,
        };

        let feedback = match (row.feedback_rating, row.feedback_at) {
            (Some(rating), Some(submitted_at)) => Some(Feedback {
                rating: u8::try_from(rating).map_err(|_| {
                    AppError::database(format!(
                        "Ticket {} has an out-of-range stored rating {rating}",
                        row.id
                    ))
                })?,
                comment: row.feedback_comment,
                submitted_at,
            }),
            _ => None,
        };

        Ok(Self {
            id: TicketId::from_uuid(row.id),
            need_id: NeedId::from_uuid(row.need_id),
            responder_id: ResponderId::from_uuid(row.responder_id),
            status: row.status,
            scheduling,
            requester_confirmed: row.requester_confirmed,
            confirmed_at: row.confirmed_at,
            feedback,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for handling tickets.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn insert_if_absent(&self, ticket: &HandlingTicket) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO tickets (id, need_id, responder_id, status, requester_confirmed, \
             version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (need_id, responder_id) DO NOTHING",
        )
        .bind(ticket.id)
        .bind(ticket.need_id)
        .bind(ticket.responder_id)
        .bind(ticket.status)
        .bind(ticket.requester_confirmed)
        .bind(ticket.version)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create ticket", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: TicketId) -> AppResult<Option<HandlingTicket>> {
        sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))?
            .map(HandlingTicket::try_from)
            .transpose()
    }

    async fn find_by_pair(
        &self,
        need_id: NeedId,
        responder_id: ResponderId,
    ) -> AppResult<Option<HandlingTicket>> {
        sqlx::query_as::<_, TicketRow>(
            "SELECT * FROM tickets WHERE need_id = $1 AND responder_id = $2",
        )
        .bind(need_id)
        .bind(responder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))?
        .map(HandlingTicket::try_from)
        .transpose()
    }

    async fn find_by_need(&self, need_id: NeedId) -> AppResult<Vec<HandlingTicket>> {
        sqlx::query_as::<_, TicketRow>(
            "SELECT * FROM tickets WHERE need_id = $1 ORDER BY created_at, id",
        )
        .bind(need_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tickets", e))?
        .into_iter()
        .map(HandlingTicket::try_from)
        .collect()
    }

    async fn update(&self, ticket: &HandlingTicket) -> AppResult<HandlingTicket> {
        let scheduling = ticket.scheduling.as_ref();
        let feedback = ticket.feedback.as_ref();
        let row = sqlx::query_as::<_, TicketRow>(
            "UPDATE tickets SET status = $3, volunteer_name = $4, volunteer_contact = $5, \
             scheduled_date = $6, scheduled_time = $7, requester_confirmed = $8, \
             confirmed_at = $9, feedback_rating = $10, feedback_comment = $11, feedback_at = $12, \
             version = version + 1, updated_at = $13 \
             WHERE id = $1 AND version = $2 RETURNING *",
        )
        .bind(ticket.id)
        .bind(ticket.version)
        .bind(ticket.status)
        .bind(scheduling.map(|s| s.volunteer_name.as_str()))
        .bind(scheduling.map(|s| s.volunteer_contact.as_str()))
        .bind(scheduling.map(|s| s.date))
        .bind(scheduling.map(|s| s.time))
        .bind(ticket.requester_confirmed)
        .bind(ticket.confirmed_at)
        .bind(feedback.map(|f| i16::from(f.rating)))
        .bind(feedback.and_then(|f| f.comment.as_deref()))
        .bind(feedback.map(|f| f.submitted_at))
        .bind(ticket.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update ticket", e))?;

        match row {
            Some(row) => HandlingTicket::try_from(row),
            None => {
                let actual: Option<i64> =
                    sqlx::query_scalar("SELECT version FROM tickets WHERE id = $1")
                        .bind(ticket.id)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(|e| {
                            AppError::with_source(ErrorKind::Database, "Failed to read ticket version", e)
                        })?;
                Err(match actual {
                    Some(actual) => AppError::conflict(format!(
                        "Ticket {} was modified concurrently (expected version {}, found {actual})",
                        ticket.id, ticket.version
                    )),
                    None => AppError::not_found(format!("Ticket {} not found", ticket.id)),
                })
            }
        }
    }
}
