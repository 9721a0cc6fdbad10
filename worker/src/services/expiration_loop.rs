use anyhow::Result;
use crates::domain::repositories::{
    plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::usecases::sweep_expired_plans::{SweepExpiredPlansParams, SweepExpiredPlansUseCase};

/// Runs a sweep immediately, then once per `interval`. A failed sweep is logged and retried on the next tick.
pub async fn run<U, P>(usecase: Arc<SweepExpiredPlansUseCase<U, P>>, interval: Duration) -> Result<()>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    info!(
        interval_secs = interval.as_secs(),
        "expiration_loop: starting worker loop"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match usecase.run(SweepExpiredPlansParams::default()).await {
            Ok(result) if result.scanned > 0 => {
                info!(
                    expired = result.expired,
                    failed = result.failed,
                    "expiration_loop: expired plans processed"
                );
            }
            Ok(_) => {}
            Err(err) => {
                error!(error = ?err, "expiration_loop: sweep failed");
            }
        }
    }
}
