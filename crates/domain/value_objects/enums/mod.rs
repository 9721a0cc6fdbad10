pub mod deactivation_reasons;
pub mod plan_tiers;
pub mod property_statuses;
pub mod report_reasons;
pub mod report_statuses;
