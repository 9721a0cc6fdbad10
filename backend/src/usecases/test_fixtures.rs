use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::{properties::PropertyEntity, users::UserEntity},
    value_objects::enums::{
        deactivation_reasons::DeactivationReason, plan_tiers::PlanTier,
        property_statuses::PropertyStatus,
    },
};
use uuid::Uuid;

pub fn account(user_id: Uuid, tier: PlanTier, plan_end_date: Option<DateTime<Utc>>) -> UserEntity {
    let now = Utc::now();
    UserEntity {
        id: user_id,
        email: Some("agencia@example.com".to_string()),
        company_name: Some("Inmobiliaria Centro".to_string()),
        plan_tier: Some(tier.to_string()),
        is_founder: false,
        founder_discount: None,
        plan_start_date: plan_end_date.map(|_| now - Duration::days(30)),
        plan_end_date,
        created_at: now - Duration::days(90),
        updated_at: now,
    }
}

pub fn expired_account(user_id: Uuid, tier: PlanTier) -> UserEntity {
    account(user_id, tier, Some(Utc::now() - Duration::days(1)))
}

pub fn property(owner: Uuid, age_days: i64) -> PropertyEntity {
    let created_at = Utc::now() - Duration::days(age_days);
    PropertyEntity {
        id: Uuid::new_v4(),
        user_id: owner,
        title: format!("Casa {age_days}"),
        status: PropertyStatus::Available.to_string(),
        is_active: true,
        is_featured: false,
        featured_at: None,
        deactivated_reason: None,
        deactivated_at: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn inactive_property(owner: Uuid, reason: DeactivationReason) -> PropertyEntity {
    let mut property = property(owner, 3);
    property.is_active = false;
    property.deactivated_reason = Some(reason.to_string());
    property.deactivated_at = Some(Utc::now());
    property
}
