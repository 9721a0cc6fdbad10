pub mod admin_stats;
pub mod attachments;
pub mod errors;
pub mod plan_changes;
pub mod plan_expiration;
pub mod plan_limits;
pub mod plan_reactivation;
pub mod property_lifecycle;
pub mod property_reports;

#[cfg(test)]
pub(crate) mod test_fixtures;
