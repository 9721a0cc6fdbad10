use crates::domain::value_objects::enums::plan_tiers::PlanTier;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub founder: Founder,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Megabytes.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

/// Terms granted to founder accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Founder {
    pub default_discount_percent: i32,
    pub offer_tier: PlanTier,
    pub offer_months: u32,
}

impl Default for Founder {
    fn default() -> Self {
        Self {
            default_discount_percent: 50,
            offer_tier: PlanTier::Professional,
            offer_months: 12,
        }
    }
}
