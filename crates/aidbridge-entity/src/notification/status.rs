//! Coarse inbox status mirrored from ticket status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ticket::TicketStatus;

/// Read-optimized mirror of a ticket's status shown in the responder inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inbox_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InboxStatus {
    /// Not acted upon yet.
    New,
    /// Accepted by the responder.
    Accepted,
    /// Scheduled for pickup or delivery.
    InProgress,
    /// Completed.
    Fulfilled,
    /// Rejected by the responder.
    Ignored,
}

impl InboxStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Fulfilled => "fulfilled",
            Self::Ignored => "ignored",
        }
    }
}

impl From<TicketStatus> for InboxStatus {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Pending => Self::New,
            TicketStatus::Accepted => Self::Accepted,
            TicketStatus::Scheduled => Self::InProgress,
            TicketStatus::Completed => Self::Fulfilled,
            TicketStatus::Rejected => Self::Ignored,
        }
    }
}

impl fmt::Display for InboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
