//! Points and badge tier configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One named badge tier and the cumulative points that unlock it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTierConfig {
    /// Display name of the tier (e.g., `"Bronze"`).
    pub name: String,
    /// Minimum cumulative points required.
    pub threshold: i64,
}

/// Scoring configuration shared by responders and requesters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points credited to a responder for each completed ticket.
    #[serde(default = "default_completion_points")]
    pub completion_points: i64,
    /// Points credited to a requester for submitting feedback.
    #[serde(default = "default_feedback_points")]
    pub feedback_points: i64,
    /// Ordered badge tier table.
    #[serde(default = "default_badge_tiers")]
    pub badge_tiers: Vec<BadgeTierConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            completion_points: default_completion_points(),
            feedback_points: default_feedback_points(),
            badge_tiers: default_badge_tiers(),
        }
    }
}

impl ScoringConfig {
    /// Reject negative awards and badge tables that are not strictly ascending.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.completion_points < 0 || self.feedback_points < 0 {
            return Err(AppError::configuration(
                "scoring awards must be non-negative",
            ));
        }

        for pair in self.badge_tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(AppError::configuration(format!(
                    "badge tier '{}' must have a higher threshold than '{}'",
                    pair[1].name, pair[0].name
                )));
            }
        }

        if self.badge_tiers.iter().any(|t| t.name.trim().is_empty()) {
            return Err(AppError::configuration("badge tier names must not be empty"));
        }

        Ok(())
    }
}

fn default_completion_points() -> i64 {
    100
}

fn default_feedback_points() -> i64 {
    10
}

fn default_badge_tiers() -> Vec<BadgeTierConfig> {
    [("Bronze", 100), ("Silver", 300), ("Gold", 600), ("Platinum", 1000)]
        .into_iter()
        .map(|(name, threshold)| BadgeTierConfig {
            name: name.to_string(),
            threshold,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_ascending() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.badge_tiers.len(), 4);
        assert_eq!(config.badge_tiers[0].name, "Bronze");
    }

    #[test]
    fn test_rejects_unordered_tiers() {
        let mut config = ScoringConfig::default();
        config.badge_tiers.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_award() {
        let config = ScoringConfig {
            completion_points: -5,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
