//! Responder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidbridge_core::AppError;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::ResponderId;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORIES: usize = 32;

/// An organization able to fulfil needs and offers.
///
/// `points` and `badges` are a projection of the ledger, refreshed after
/// every recompute. Badges held on the record are never removed, and
/// `points` only moves forward to a score derived from more ledger entries
/// than the one it already reflects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responder {
    /// Unique identifier; equal to the responder actor's id.
    pub id: ResponderId,
    /// Display name.
    pub name: String,
    /// Capability categories, lowercase.
    pub categories: Vec<String>,
    /// Base location used for nearest-N lookup.
    pub location: GeoPoint,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Cumulative points from the ledger.
    pub points: i64,
    /// Badge tier names ever earned.
    pub badges: Vec<String>,
    /// Number of ledger entries `points` was derived from.
    #[serde(default)]
    pub scored_entries: i64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Responder {
    /// Build a responder record from validated input.
    pub fn new(id: ResponderId, input: CreateResponder) -> Self {
        let now = Utc::now();
        let mut categories: Vec<String> = input
            .categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        categories.sort();
        categories.dedup();

        Self {
            id,
            name: input.name.trim().to_string(),
            categories,
            location: input.location,
            contact_email: input.contact_email,
            points: 0,
            badges: Vec::new(),
            scored_entries: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this responder handles `category`.
    pub fn handles(&self, category: &str) -> bool {
        let category = category.trim().to_lowercase();
        self.categories.iter().any(|c| *c == category)
    }

    /// Apply a score derived from the first `entries` ledger entries.
    ///
    /// A score older than the one already applied leaves `points` alone.
    /// Badges are merged either way.
    pub fn apply_score(&mut self, points: i64, entries: i64, earned: &[String]) {
        if entries > self.scored_entries {
            self.points = points;
            self.scored_entries = entries;
        }
        for badge in earned {
            if !self.badges.contains(badge) {
                self.badges.push(badge.clone());
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Data required to register a responder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponder {
    /// Organization name.
    pub name: String,
    /// Capability categories.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Base location.
    pub location: GeoPoint,
    /// Contact email.
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl CreateResponder {
    /// Validate the registration input.
    pub fn validate(&self) -> Result<(), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Responder name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::validation(format!(
                "Responder name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.categories.len() > MAX_CATEGORIES {
            return Err(AppError::validation(format!(
                "At most {MAX_CATEGORIES} categories are allowed"
            )));
        }
        if self
            .contact_email
            .as_deref()
            .is_some_and(|e| !e.contains('@'))
        {
            return Err(AppError::validation("Contact email is not valid"));
        }
        self.location.validate()
    }
}
