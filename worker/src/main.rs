use anyhow::Result;
use backend::usecases::plan_expiration::PlanExpirationUseCase;
use crates::infra::db::{
    postgres::postgres_connection,
    repositories::{plan_accounts::PlanAccountPostgres, properties::PropertyLifecyclePostgres},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config, services::expiration_loop,
    usecases::sweep_expired_plans::SweepExpiredPlansUseCase,
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let account_repository = Arc::new(PlanAccountPostgres::new(Arc::clone(&db_pool_arc)));
    let property_repository = Arc::new(PropertyLifecyclePostgres::new(Arc::clone(&db_pool_arc)));

    let expiration_usecase = Arc::new(PlanExpirationUseCase::new(
        Arc::clone(&account_repository),
        property_repository,
    ));
    let sweep_usecase = Arc::new(SweepExpiredPlansUseCase::new(
        account_repository,
        expiration_usecase,
        dotenvy_env.expiration.batch_limit,
    ));

    let expiration_loop = tokio::spawn(expiration_loop::run(
        Arc::clone(&sweep_usecase),
        Duration::from_secs(dotenvy_env.expiration.interval_secs),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let internal_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, sweep_usecase).await });

    tokio::select! {
        result = expiration_loop => result??,
        result = internal_server => result??,
    };
    Ok(())
}
