use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::properties::PropertyEntity, value_objects::enums::plan_tiers::PlanTier,
};

/// Order in which listings keep (or regain) an active slot: featured first,
/// then newest, then lowest id so the choice is deterministic.
pub fn retention_order(a: &PropertyEntity, b: &PropertyEntity) -> Ordering {
    b.is_featured
        .cmp(&a.is_featured)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Active listings that must be deactivated so at most `limit` stay active.
pub fn select_excess_active(active: &[PropertyEntity], limit: Option<i64>) -> Vec<Uuid> {
    let Some(limit) = limit else {
        return Vec::new();
    };
    let keep = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

    let mut ranked: Vec<&PropertyEntity> = active.iter().filter(|p| p.is_active).collect();
    ranked.sort_by(|a, b| retention_order(a, b));
    ranked.into_iter().skip(keep).map(|p| p.id).collect()
}

/// Auto-deactivated listings to bring back given `slots` free places (`None` = unlimited).
pub fn select_for_reactivation(candidates: &[PropertyEntity], slots: Option<i64>) -> Vec<Uuid> {
    let take = match slots {
        Some(slots) => usize::try_from(slots.max(0)).unwrap_or(usize::MAX),
        None => usize::MAX,
    };

    let mut ranked: Vec<&PropertyEntity> = candidates
        .iter()
        .filter(|p| {
            !p.is_active
                && !p.is_suspended()
                && p.deactivation_reason().is_some_and(|r| r.is_automatic())
        })
        .collect();
    ranked.sort_by(|a, b| retention_order(a, b));
    ranked.into_iter().take(take).map(|p| p.id).collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExpirationOutcome {
    pub user_id: Uuid,
    pub expired: bool,
    pub old_tier: PlanTier,
    pub new_tier: PlanTier,
    pub deactivated_count: usize,
    pub deactivated_ids: Vec<Uuid>,
    pub remaining_active: i64,
}

impl ExpirationOutcome {
    pub fn unchanged(user_id: Uuid, tier: PlanTier, active: i64) -> Self {
        Self {
            user_id,
            expired: false,
            old_tier: tier,
            new_tier: tier,
            deactivated_count: 0,
            deactivated_ids: Vec::new(),
            remaining_active: active,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReactivationOutcome {
    pub user_id: Uuid,
    pub reactivated_count: usize,
    pub reactivated_ids: Vec<Uuid>,
    pub active_after: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanChangeOutcome {
    pub user_id: Uuid,
    pub old_tier: PlanTier,
    pub new_tier: PlanTier,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
    pub deactivated_ids: Vec<Uuid>,
    pub reactivated_ids: Vec<Uuid>,
}

/// Plan row update applied together with the listing reconciliation it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanChange {
    pub user_id: Uuid,
    pub tier: PlanTier,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanChangeApplied {
    pub deactivated_ids: Vec<Uuid>,
    pub reactivated_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::properties::fixtures::{active_property, deactivated_property},
        value_objects::enums::deactivation_reasons::DeactivationReason,
    };

    #[test]
    fn ten_listings_down_to_free_keeps_the_five_newest() {
        let owner = Uuid::new_v4();
        let listings: Vec<PropertyEntity> = (0..10).map(|age| active_property(owner, age)).collect();

        let excess = select_excess_active(&listings, Some(5));

        assert_eq!(excess.len(), 5);
        let expected: Vec<Uuid> = listings[5..].iter().map(|p| p.id).collect();
        assert_eq!(excess, expected);
    }

    #[test]
    fn featured_listings_are_kept_before_newer_ones() {
        let owner = Uuid::new_v4();
        let mut oldest = active_property(owner, 100);
        oldest.is_featured = true;
        let listings = vec![active_property(owner, 1), active_property(owner, 2), oldest.clone()];

        let excess = select_excess_active(&listings, Some(1));

        assert_eq!(excess.len(), 2);
        assert!(!excess.contains(&oldest.id));
    }

    #[test]
    fn nothing_is_deactivated_under_the_limit_or_when_unlimited() {
        let owner = Uuid::new_v4();
        let listings: Vec<PropertyEntity> = (0..3).map(|age| active_property(owner, age)).collect();

        assert!(select_excess_active(&listings, Some(5)).is_empty());
        assert!(select_excess_active(&listings, None).is_empty());
    }

    #[test]
    fn same_creation_time_breaks_ties_by_id() {
        let owner = Uuid::new_v4();
        let first = active_property(owner, 3);
        let mut second = first.clone();
        second.id = Uuid::new_v4();

        let listings = vec![first.clone(), second.clone()];
        let excess = select_excess_active(&listings, Some(1));

        assert_eq!(excess, vec![first.id.max(second.id)]);
    }

    #[test]
    fn reactivation_respects_slots() {
        let owner = Uuid::new_v4();
        let candidates: Vec<PropertyEntity> = (0..6)
            .map(|age| deactivated_property(owner, age, DeactivationReason::PlanExpired))
            .collect();

        let chosen = select_for_reactivation(&candidates, Some(4));
        assert_eq!(chosen.len(), 4);
        assert_eq!(chosen[0], candidates[0].id);

        assert!(select_for_reactivation(&candidates, Some(0)).is_empty());
        assert!(select_for_reactivation(&candidates, Some(-3)).is_empty());
        assert_eq!(select_for_reactivation(&candidates, None).len(), 6);
    }

    #[test]
    fn manual_archives_are_never_reactivated() {
        let owner = Uuid::new_v4();
        let candidates = vec![
            deactivated_property(owner, 1, DeactivationReason::ManualArchive),
            deactivated_property(owner, 2, DeactivationReason::Reported),
            deactivated_property(owner, 3, DeactivationReason::PlanDowngrade),
        ];

        let chosen = select_for_reactivation(&candidates, None);
        assert_eq!(chosen, vec![candidates[2].id]);
    }
}
