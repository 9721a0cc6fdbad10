pub mod admin_stats;
pub mod attachments;
pub mod enums;
pub mod plan_enforcement;
pub mod plans;
pub mod properties;
pub mod property_reports;
