//! Ticket status enumeration and transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of one responder's handling ticket.
///
/// Legal edges:
///   Pending → Accepted | Rejected
///   Accepted → Scheduled
///   Scheduled → Completed (additionally gated on requester confirmation)
///
/// `Rejected` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Dispatched, awaiting the responder's decision.
    Pending,
    /// The responder agreed to handle the need.
    Accepted,
    /// The responder declined.
    Rejected,
    /// Volunteer, date, and time have been attached.
    Scheduled,
    /// Handoff confirmed and closed by the responder.
    Completed,
}

impl TicketStatus {
    /// Check whether moving from this status to `next` is an edge of the table.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Accepted, Self::Scheduled)
                | (Self::Scheduled, Self::Completed)
        )
    }

    /// Check if the ticket can no longer change status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Precedence used when reducing tickets into a need's aggregate status.
    ///
    /// `Rejected` ranks below everything so that it never wins.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Rejected => 0,
            Self::Pending => 1,
            Self::Accepted => 2,
            Self::Scheduled => 3,
            Self::Completed => 4,
        }
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = aidbridge_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            _ => Err(aidbridge_core::AppError::validation(format!(
                "Invalid ticket status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TicketStatus; 5] = [
        TicketStatus::Pending,
        TicketStatus::Accepted,
        TicketStatus::Rejected,
        TicketStatus::Scheduled,
        TicketStatus::Completed,
    ];

    #[test]
    fn test_exactly_four_edges() {
        let edges: Vec<_> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();
        assert_eq!(
            edges,
            vec![
                (TicketStatus::Pending, TicketStatus::Accepted),
                (TicketStatus::Pending, TicketStatus::Rejected),
                (TicketStatus::Accepted, TicketStatus::Scheduled),
                (TicketStatus::Scheduled, TicketStatus::Completed),
            ]
        );
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn test_edges_never_regress() {
        for from in ALL {
            for to in ALL {
                if from.can_transition_to(to) && to != TicketStatus::Rejected {
                    assert!(to.precedence() > from.precedence());
                }
            }
        }
    }

    #[test]
    fn test_round_trip_str() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
    }
}
