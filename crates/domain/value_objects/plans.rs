use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::plan_tiers::PlanTier;

pub const ALLOWED_ATTACHMENT_MIMES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// Limits and feature flags attached to a plan tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanLimits {
    pub plan_tier: PlanTier,
    /// `None` means unlimited.
    pub max_active_properties: Option<i64>,
    pub max_images_per_property: i32,
    pub allow_attachments: bool,
    pub allow_featured: bool,
    pub allow_analytics: bool,
    pub allow_priority_support: bool,
    pub featured_per_month: i64,
}

impl PlanLimits {
    pub fn for_tier(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Free => Self {
                plan_tier: tier,
                max_active_properties: Some(5),
                max_images_per_property: 10,
                allow_attachments: false,
                allow_featured: false,
                allow_analytics: false,
                allow_priority_support: false,
                featured_per_month: 0,
            },
            PlanTier::Pro => Self {
                plan_tier: tier,
                max_active_properties: Some(10),
                max_images_per_property: 15,
                allow_attachments: true,
                allow_featured: false,
                allow_analytics: true,
                allow_priority_support: false,
                featured_per_month: 0,
            },
            PlanTier::Professional => Self {
                plan_tier: tier,
                max_active_properties: Some(20),
                max_images_per_property: 20,
                allow_attachments: true,
                allow_featured: true,
                allow_analytics: true,
                allow_priority_support: true,
                featured_per_month: 3,
            },
            PlanTier::Business => Self {
                plan_tier: tier,
                max_active_properties: Some(50),
                max_images_per_property: 25,
                allow_attachments: true,
                allow_featured: true,
                allow_analytics: true,
                allow_priority_support: true,
                featured_per_month: 5,
            },
            PlanTier::Premium => Self {
                plan_tier: tier,
                max_active_properties: None,
                max_images_per_property: 30,
                allow_attachments: true,
                allow_featured: true,
                allow_analytics: true,
                allow_priority_support: true,
                featured_per_month: 10,
            },
        }
    }

    pub fn allows_active_count(&self, active_count: i64) -> bool {
        match self.max_active_properties {
            Some(max) => active_count <= max,
            None => true,
        }
    }

    /// Whether one more listing may be activated on top of `active_count`.
    pub fn can_activate_one_more(&self, active_count: i64) -> bool {
        self.allows_active_count(active_count + 1)
    }

    /// Free activation slots left. `None` when the plan is unlimited.
    pub fn remaining_slots(&self, active_count: i64) -> Option<i64> {
        self.max_active_properties
            .map(|max| (max - active_count).max(0))
    }
}

/// Per-message attachment limits for tiers that allow attachments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentLimits {
    pub max_files: usize,
    pub max_size_mb: u64,
    pub daily_count: i64,
}

impl AttachmentLimits {
    pub fn for_tier(tier: PlanTier) -> Option<Self> {
        let (max_files, max_size_mb, daily_count) = match tier {
            PlanTier::Free => return None,
            PlanTier::Pro => (3, 5, 20),
            PlanTier::Professional => (5, 10, 50),
            PlanTier::Business => (5, 15, 100),
            PlanTier::Premium => (10, 25, 200),
        };

        Some(Self {
            max_files,
            max_size_mb,
            daily_count,
        })
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }

    pub fn allows_mime(mime_type: &str) -> bool {
        ALLOWED_ATTACHMENT_MIMES.contains(&mime_type.trim().to_ascii_lowercase().as_str())
    }
}

/// Monthly list price in minor currency units.
pub fn monthly_price_minor(tier: PlanTier) -> i64 {
    match tier {
        PlanTier::Free => 0,
        PlanTier::Pro => 1_500_000,
        PlanTier::Professional => 2_750_000,
        PlanTier::Business => 4_000_000,
        PlanTier::Premium => 5_000_000,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanCatalogEntry {
    pub tier: PlanTier,
    pub name: &'static str,
    pub monthly_price_minor: i64,
    pub limits: PlanLimits,
    pub attachments: Option<AttachmentLimits>,
}

pub fn plan_catalog() -> Vec<PlanCatalogEntry> {
    PlanTier::ALL
        .iter()
        .map(|tier| PlanCatalogEntry {
            tier: *tier,
            name: tier.display_name(),
            monthly_price_minor: monthly_price_minor(*tier),
            limits: PlanLimits::for_tier(*tier),
            attachments: AttachmentLimits::for_tier(*tier),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanQuote {
    pub tier: PlanTier,
    pub months: u32,
    pub subtotal_minor: i64,
    pub discount_percent: i32,
    pub discount_minor: i64,
    pub total_minor: i64,
    pub founder_pricing: bool,
}

/// Prices `months` of `tier`. Founders get their discount off the subtotal, rounded down.
pub fn quote_plan(tier: PlanTier, months: u32, founder_discount: Option<i32>) -> PlanQuote {
    let subtotal_minor = monthly_price_minor(tier) * i64::from(months);
    let discount_percent = founder_discount.unwrap_or(0).clamp(0, 100);
    let discount_minor = subtotal_minor * i64::from(discount_percent) / 100;

    PlanQuote {
        tier,
        months,
        subtotal_minor,
        discount_percent,
        discount_minor,
        total_minor: subtotal_minor - discount_minor,
        founder_pricing: founder_discount.is_some() && discount_percent > 0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPlanInfoDto {
    pub user_id: Uuid,
    pub plan_tier: PlanTier,
    pub effective_tier: PlanTier,
    pub is_founder: bool,
    pub founder_discount: Option<i32>,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
    pub is_plan_active: bool,
    pub days_remaining: Option<i64>,
    pub active_properties: i64,
    pub limits: PlanLimits,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivationCheck {
    pub allowed: bool,
    pub active_count: i64,
    pub max_active_properties: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePlanRequest {
    pub tier: PlanTier,
    pub months: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GrantFounderRequest {
    pub discount_percent: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReactivateRequest {
    /// Omit to use the limit of the user's effective tier.
    pub max_active_properties: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteQuery {
    pub tier: PlanTier,
    pub months: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_allows_five_active_listings() {
        let limits = PlanLimits::for_tier(PlanTier::Free);
        assert!(limits.allows_active_count(5));
        assert!(!limits.allows_active_count(6));
        assert!(limits.can_activate_one_more(4));
        assert!(!limits.can_activate_one_more(5));
    }

    #[test]
    fn professional_allows_twenty() {
        assert_eq!(
            PlanLimits::for_tier(PlanTier::Professional).max_active_properties,
            Some(20)
        );
    }

    #[test]
    fn premium_is_unlimited() {
        let limits = PlanLimits::for_tier(PlanTier::Premium);
        assert!(limits.allows_active_count(10_000));
        assert_eq!(limits.remaining_slots(10_000), None);
    }

    #[test]
    fn remaining_slots_never_negative() {
        let limits = PlanLimits::for_tier(PlanTier::Free);
        assert_eq!(limits.remaining_slots(2), Some(3));
        assert_eq!(limits.remaining_slots(9), Some(0));
    }

    #[test]
    fn free_has_no_attachments() {
        assert!(!PlanLimits::for_tier(PlanTier::Free).allow_attachments);
        assert!(AttachmentLimits::for_tier(PlanTier::Free).is_none());
    }

    #[test]
    fn attachment_mimes_are_normalized() {
        assert!(AttachmentLimits::allows_mime("IMAGE/PNG"));
        assert!(AttachmentLimits::allows_mime("application/pdf"));
        assert!(!AttachmentLimits::allows_mime("application/zip"));
    }

    #[test]
    fn catalog_lists_every_tier_in_rank_order() {
        let catalog = plan_catalog();
        assert_eq!(catalog.len(), PlanTier::ALL.len());
        assert_eq!(catalog[0].tier, PlanTier::Free);
        assert_eq!(catalog[4].tier, PlanTier::Premium);
        assert_eq!(catalog[2].monthly_price_minor, 2_750_000);
    }

    #[test]
    fn founder_discount_is_rounded_down() {
        let quote = quote_plan(PlanTier::Professional, 3, Some(33));
        assert_eq!(quote.subtotal_minor, 8_250_000);
        assert_eq!(quote.discount_minor, 2_722_500);
        assert_eq!(quote.total_minor, 5_527_500);
        assert!(quote.founder_pricing);
    }

    #[test]
    fn quote_without_founder_has_no_discount() {
        let quote = quote_plan(PlanTier::Premium, 1, None);
        assert_eq!(quote.total_minor, 5_000_000);
        assert_eq!(quote.discount_percent, 0);
        assert!(!quote.founder_pricing);
    }

    #[test]
    fn out_of_range_discount_is_clamped() {
        let quote = quote_plan(PlanTier::Pro, 1, Some(150));
        assert_eq!(quote.discount_percent, 100);
        assert_eq!(quote.total_minor, 0);
    }
}
