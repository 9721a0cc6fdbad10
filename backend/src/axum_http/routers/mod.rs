pub mod admin;
pub mod attachments;
pub mod plans;
pub mod properties;
pub mod reports;
