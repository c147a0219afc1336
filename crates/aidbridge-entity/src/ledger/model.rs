//! Activity ledger entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use aidbridge_core::AppError;
use aidbridge_core::types::id::{LedgerEntryId, TicketId};

/// Which kind of actor a ledger entry credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "actor_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    /// An end user who posts needs and offers.
    Requester,
    /// A responder organization.
    Responder,
}

impl ActorType {
    /// Return the actor type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Responder => "responder",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requester" => Ok(Self::Requester),
            "responder" => Ok(Self::Responder),
            _ => Err(AppError::validation(format!("Invalid actor type: '{s}'"))),
        }
    }
}

/// An append-only point-affecting fact. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// Kind of actor credited.
    pub actor_type: ActorType,
    /// The credited actor.
    pub actor_id: Uuid,
    /// Human-readable reason.
    pub description: String,
    /// Signed point delta.
    pub points_delta: i64,
    /// The ticket that produced this entry, if any.
    pub ticket_id: Option<TicketId>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

/// Data for a ledger append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// Kind of actor credited.
    pub actor_type: ActorType,
    /// The credited actor.
    pub actor_id: Uuid,
    /// Human-readable reason.
    pub description: String,
    /// Signed point delta.
    pub points_delta: i64,
    /// Originating ticket.
    pub ticket_id: Option<TicketId>,
}

impl NewLedgerEntry {
    /// Stamp an id and timestamp onto the entry.
    pub fn into_entry(self) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            actor_type: self.actor_type,
            actor_id: self.actor_id,
            description: self.description,
            points_delta: self.points_delta,
            ticket_id: self.ticket_id,
            created_at: Utc::now(),
        }
    }
}
