pub mod properties;
pub mod property_reports;
pub mod users;
