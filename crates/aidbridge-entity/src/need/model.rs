//! Need / offer entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use aidbridge_core::AppError;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::{NeedId, UserId};

use super::status::AggregateStatus;

const MAX_CATEGORY_LEN: usize = 64;
const MAX_DESCRIPTION_LEN: usize = 4000;
const MAX_ADDRESS_LEN: usize = 500;

/// Whether a record asks for help or offers goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "need_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    /// Assistance requested by the requester.
    Need,
    /// Items the requester wants to donate.
    Offer,
}

impl NeedKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Need => "need",
            Self::Offer => "offer",
        }
    }
}

impl fmt::Display for NeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NeedKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "need" => Ok(Self::Need),
            "offer" => Ok(Self::Offer),
            _ => Err(AppError::validation(format!("Invalid need kind: '{s}'"))),
        }
    }
}

/// A unit of assistance needed, or an item to donate.
///
/// Immutable after dispatch; the aggregate status is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Need {
    /// Unique identifier.
    pub id: NeedId,
    /// Need or donation offer.
    pub kind: NeedKind,
    /// Free-form category, matched against responder capabilities.
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Where the need is, or where the donation is picked up.
    pub location: GeoPoint,
    /// Optional street address.
    pub address: Option<String>,
    /// Where a donation should be delivered, if the requester chose one.
    pub drop_location: Option<GeoPoint>,
    /// Emergency flag, escalated in inbox ordering and aggregate status.
    pub emergency: bool,
    /// The requester who created it.
    pub requester_id: UserId,
    /// Status kept when no ticket contributes one.
    pub base_status: AggregateStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Need {
    /// Build a new need from validated input.
    pub fn new(input: CreateNeed, requester_id: UserId) -> Self {
        Self {
            id: NeedId::new(),
            kind: input.kind,
            category: input.category.trim().to_lowercase(),
            description: input.description.trim().to_string(),
            location: input.location,
            address: input
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            drop_location: input.drop_location,
            emergency: input.emergency,
            requester_id,
            base_status: AggregateStatus::Submitted,
            created_at: Utc::now(),
        }
    }

    /// Donation offers get a pickup event when scheduled.
    pub fn is_donation(&self) -> bool {
        self.kind == NeedKind::Offer
    }
}

/// Data required to register a new need or offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNeed {
    /// Need or offer.
    pub kind: NeedKind,
    /// Category.
    pub category: String,
    /// Description.
    pub description: String,
    /// Location.
    pub location: GeoPoint,
    /// Optional address.
    #[serde(default)]
    pub address: Option<String>,
    /// Optional drop location for donations.
    #[serde(default)]
    pub drop_location: Option<GeoPoint>,
    /// Emergency flag.
    #[serde(default)]
    pub emergency: bool,
}

impl CreateNeed {
    /// Check field presence, lengths, and coordinate ranges.
    pub fn validate(&self) -> Result<(), AppError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(AppError::validation("Category is required"));
        }
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(AppError::validation(format!(
                "Category must be at most {MAX_CATEGORY_LEN} characters"
            )));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(AppError::validation("Description is required"));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        if self
            .address
            .as_ref()
            .is_some_and(|a| a.chars().count() > MAX_ADDRESS_LEN)
        {
            return Err(AppError::validation(format!(
                "Address must be at most {MAX_ADDRESS_LEN} characters"
            )));
        }
        self.location.validate()?;
        if let Some(drop) = &self.drop_location {
            if self.kind != NeedKind::Offer {
                return Err(AppError::validation(
                    "A drop location only applies to donation offers",
                ));
            }
            drop.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidbridge_core::error::ErrorKind;

    fn input() -> CreateNeed {
        CreateNeed {
            kind: NeedKind::Offer,
            category: " Food ".into(),
            description: "20 meal packets".into(),
            location: GeoPoint::new(19.07, 72.87),
            address: Some("  ".into()),
            drop_location: Some(GeoPoint::new(19.10, 72.90)),
            emergency: false,
        }
    }

    #[test]
    fn test_new_normalizes_fields() {
        let input = input();
        input.validate().unwrap();
        let need = Need::new(input, UserId::new());
        assert_eq!(need.category, "food");
        assert!(need.address.is_none());
        assert!(need.is_donation());
        assert_eq!(need.base_status, AggregateStatus::Submitted);
    }

    #[test]
    fn test_blank_description_rejected() {
        let mut input = input();
        input.description = "   ".into();
        assert_eq!(input.validate().unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_out_of_range_location_rejected() {
        let mut input = input();
        input.location = GeoPoint::new(91.0, 0.0);
        assert_eq!(input.validate().unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_drop_location_only_for_offers() {
        let mut input = input();
        input.kind = NeedKind::Need;
        assert_eq!(input.validate().unwrap_err().kind, ErrorKind::Validation);
    }
}
