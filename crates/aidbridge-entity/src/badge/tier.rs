//! Badge tiers and derivation from a point total.

use serde::{Deserialize, Serialize};

use aidbridge_core::config::BadgeTierConfig;

/// A named achievement level unlocked at a cumulative point threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTier {
    /// Tier name.
    pub name: String,
    /// Minimum points required.
    pub threshold: i64,
}

/// Ordered badge tier table shared by every actor of a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTable {
    tiers: Vec<BadgeTier>,
}

impl BadgeTable {
    /// Build a table from configured tiers, ordered by threshold.
    pub fn from_config(tiers: &[BadgeTierConfig]) -> Self {
        let mut tiers: Vec<BadgeTier> = tiers
            .iter()
            .map(|t| BadgeTier {
                name: t.name.clone(),
                threshold: t.threshold,
            })
            .collect();
        tiers.sort_by_key(|t| t.threshold);
        Self { tiers }
    }

    /// All tiers in ascending threshold order.
    pub fn tiers(&self) -> &[BadgeTier] {
        &self.tiers
    }

    /// Every tier whose threshold is at or below `points`.
    pub fn earned(&self, points: i64) -> Vec<&BadgeTier> {
        self.tiers.iter().filter(|t| t.threshold <= points).collect()
    }

    /// Names of the earned tiers.
    pub fn earned_names(&self, points: i64) -> Vec<String> {
        self.earned(points).into_iter().map(|t| t.name.clone()).collect()
    }

    /// The lowest tier not yet reached.
    pub fn next_tier(&self, points: i64) -> Option<&BadgeTier> {
        self.tiers.iter().find(|t| t.threshold > points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidbridge_core::config::ScoringConfig;

    fn table() -> BadgeTable {
        BadgeTable::from_config(&ScoringConfig::default().badge_tiers)
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(table().earned_names(99), Vec::<String>::new());
        assert_eq!(table().earned_names(100), vec!["Bronze"]);
    }

    #[test]
    fn test_360_points_is_bronze_and_silver() {
        assert_eq!(table().earned_names(360), vec!["Bronze", "Silver"]);
        assert_eq!(table().next_tier(360).map(|t| t.name.as_str()), Some("Gold"));
    }

    #[test]
    fn test_negative_total_earns_nothing() {
        assert!(table().earned(-20).is_empty());
        assert_eq!(table().next_tier(5000), None);
    }
}
