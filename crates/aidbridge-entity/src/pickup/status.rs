//! Pickup status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use aidbridge_core::AppError;

/// Physical progress of a donation pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pickup_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    /// Slot booked.
    Scheduled,
    /// Items collected, on the way.
    InProgress,
    /// Delivered to the drop location.
    Completed,
    /// Could not be carried out.
    Failed,
    /// Called off before collection.
    Cancelled,
}

impl PickupStatus {
    /// Check whether moving to `next` is allowed.
    pub fn can_transition_to(&self, next: PickupStatus) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::InProgress)
                | (Self::Scheduled, Self::Failed)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Failed)
        )
    }

    /// Check if the pickup is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::validation(format!("Invalid pickup status: '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_final() {
        let all = [
            PickupStatus::Scheduled,
            PickupStatus::InProgress,
            PickupStatus::Completed,
            PickupStatus::Failed,
            PickupStatus::Cancelled,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            assert!(all.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn test_cannot_cancel_once_started() {
        assert!(!PickupStatus::InProgress.can_transition_to(PickupStatus::Cancelled));
        assert!(PickupStatus::InProgress.can_transition_to(PickupStatus::Failed));
    }
}
