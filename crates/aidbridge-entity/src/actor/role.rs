//! Actor role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ledger::ActorType;

/// The role an authenticated caller acts in.
///
/// Authentication happens upstream; the workflow only checks entitlement
/// (is this actor the ticket's responder, or the need's requester).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// An individual who posted a need or offer.
    Requester,
    /// A responder organization.
    Responder,
}

impl ActorRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Responder => "responder",
        }
    }

    /// The ledger actor type credited for this role.
    pub fn actor_type(&self) -> ActorType {
        match self {
            Self::Requester => ActorType::Requester,
            Self::Responder => ActorType::Responder,
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = aidbridge_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "requester" => Ok(Self::Requester),
            "responder" => Ok(Self::Responder),
            _ => Err(aidbridge_core::AppError::validation(format!(
                "Invalid actor role: '{s}'. Expected one of: requester, responder"
            ))),
        }
    }
}
