pub mod sweep_expired_plans;
