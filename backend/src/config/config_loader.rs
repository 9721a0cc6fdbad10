use std::{env, str::FromStr};

use anyhow::{Context, Result, bail};

use super::config_model::{BackendServer, Database, DotEnvyConfig, Founder, Supabase};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?,
        body_limit: optional("SERVER_BODY_LIMIT", 10)?,
        timeout: optional("SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional("DATABASE_MAX_CONNECTIONS", 10)?,
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let defaults = Founder::default();
    let founder = Founder {
        default_discount_percent: optional(
            "FOUNDER_DEFAULT_DISCOUNT",
            defaults.default_discount_percent,
        )?,
        offer_tier: optional("FOUNDER_OFFER_TIER", defaults.offer_tier)?,
        offer_months: optional("FOUNDER_OFFER_MONTHS", defaults.offer_months)?,
    };

    if !(0..=100).contains(&founder.default_discount_percent) {
        bail!("FOUNDER_DEFAULT_DISCOUNT must be between 0 and 100");
    }
    if founder.offer_months == 0 {
        bail!("FOUNDER_OFFER_MONTHS must be at least 1");
    }

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        founder,
    })
}

fn required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).with_context(|| format!("{key} is invalid"))?;
    raw.trim()
        .parse::<T>()
        .map_err(|err| anyhow::anyhow!("{key} is invalid: {err}"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{key} is invalid: {err}")),
        _ => Ok(default),
    }
}
