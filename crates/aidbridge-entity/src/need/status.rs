//! Aggregate need status and its reduction over tickets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use aidbridge_core::AppError;

use crate::ticket::TicketStatus;

/// Need-level status derived from the statuses of all its tickets.
///
/// Only `base_status` is ever persisted; the value shown to callers is
/// always recomputed with [`AggregateStatus::reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "need_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AggregateStatus {
    /// Registered; no responder has moved past pending.
    Submitted,
    /// Flagged emergency and not yet fulfilled by anyone.
    Emergency,
    /// At least one responder accepted.
    Accepted,
    /// At least one responder scheduled a pickup.
    Scheduled,
    /// At least one responder completed.
    Completed,
}

impl AggregateStatus {
    /// Reduce a need's ticket statuses into its aggregate status.
    ///
    /// Emergency wins until some ticket is completed. Otherwise the
    /// highest-precedence non-rejected ticket decides, with `pending`
    /// reading as `Submitted`. With no tickets, or only rejected ones,
    /// the need keeps `base`.
    pub fn reduce<I>(emergency: bool, base: AggregateStatus, tickets: I) -> AggregateStatus
    where
        I: IntoIterator<Item = TicketStatus>,
    {
        let top = tickets
            .into_iter()
            .filter(|s| *s != TicketStatus::Rejected)
            .max_by_key(|s| s.precedence());

        if emergency && top != Some(TicketStatus::Completed) {
            return AggregateStatus::Emergency;
        }

        match top {
            Some(TicketStatus::Completed) => AggregateStatus::Completed,
            Some(TicketStatus::Scheduled) => AggregateStatus::Scheduled,
            Some(TicketStatus::Accepted) => AggregateStatus::Accepted,
            Some(TicketStatus::Pending) => AggregateStatus::Submitted,
            Some(TicketStatus::Rejected) | None => base,
        }
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Emergency => "emergency",
            Self::Accepted => "accepted",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregateStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "emergency" => Ok(Self::Emergency),
            "accepted" => Ok(Self::Accepted),
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::validation(format!("Invalid need status: '{s}'"))),
        }
    }
}

/// A need is fully closed once every ticket is terminal and one completed.
///
/// Such a need accepts no further dispatch.
pub fn is_fully_closed<I>(tickets: I) -> bool
where
    I: IntoIterator<Item = TicketStatus>,
{
    let mut any = false;
    let mut completed = false;
    for status in tickets {
        if !status.is_terminal() {
            return false;
        }
        any = true;
        completed |= status == TicketStatus::Completed;
    }
    any && completed
}
