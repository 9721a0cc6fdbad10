pub mod attachments;
pub mod plan_accounts;
pub mod properties;
pub mod property_reports;
