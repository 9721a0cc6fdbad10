pub mod plan_expiration;
