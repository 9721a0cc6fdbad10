use std::{env, str::FromStr};

use anyhow::{Context, Result, bail};

use super::config_model::{Database, DotEnvyConfig, Expiration, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?,
        body_limit: optional("SERVER_BODY_LIMIT", 1)?,
        timeout: optional("SERVER_TIMEOUT", 120)?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional("DATABASE_MAX_CONNECTIONS", 5)?,
    };

    let expiration = Expiration {
        interval_secs: optional("PLAN_EXPIRATION_INTERVAL_SECS", 3600)?,
        batch_limit: optional("PLAN_EXPIRATION_BATCH_LIMIT", 100)?,
        internal_token: env::var("INTERNAL_EXPIRATION_TOKEN").ok().and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
    };

    if expiration.interval_secs == 0 {
        bail!("PLAN_EXPIRATION_INTERVAL_SECS must be at least 1");
    }
    if expiration.batch_limit <= 0 {
        bail!("PLAN_EXPIRATION_BATCH_LIMIT must be positive");
    }

    Ok(DotEnvyConfig {
        worker_server,
        database,
        expiration,
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
