use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::value_objects::enums::plan_tiers::PlanTier;

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct AdminStatsDto {
    pub users_by_tier: BTreeMap<String, i64>,
    pub founders: i64,
    pub expired_paid_plans: i64,
    pub active_properties: i64,
    pub inactive_properties: i64,
    pub pending_reports: i64,
}

/// Folds raw `(plan_tier, count)` rows into one entry per known tier.
/// Missing or unknown stored tiers are counted as free.
pub fn users_by_tier(rows: Vec<(Option<String>, i64)>) -> BTreeMap<String, i64> {
    let mut counts: BTreeMap<String, i64> = PlanTier::ALL
        .iter()
        .map(|tier| (tier.to_string(), 0))
        .collect();

    for (raw_tier, count) in rows {
        let tier = PlanTier::from_db(raw_tier.as_deref());
        *counts.entry(tier.to_string()).or_default() += count;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_null_tiers_fold_into_free() {
        let counts = users_by_tier(vec![
            (Some("free".to_string()), 3),
            (None, 2),
            (Some("legacy".to_string()), 1),
            (Some("premium".to_string()), 4),
        ]);

        assert_eq!(counts["free"], 6);
        assert_eq!(counts["premium"], 4);
        assert_eq!(counts["business"], 0);
        assert_eq!(counts.len(), 5);
    }
}
