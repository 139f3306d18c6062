//! queuebump -- keeps manual and CI builds ahead of scheduled builds in Azure
//! DevOps agent pool queues.
//!
//! The crate provides the bump cycle (resolve pools, inspect queues, plan and
//! apply bumps), the Azure DevOps client it runs against, configuration, and
//! the cron-driven worker loop.

pub mod bump;
pub mod config;
pub mod devops;
pub mod scheduler;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::devops::HttpDevOpsClient;
use crate::scheduler::CronTrigger;

/// Start the worker: run a bump cycle on every cron firing until `cancel` fires.
pub async fn serve(config: &WorkerConfig, cancel: CancellationToken) -> Result<()> {
    let trigger = CronTrigger::from_config(&config.schedule)?;
    let client = HttpDevOpsClient::from_config(config)?;
    let pool_names = config.pool_names();

    tracing::info!(
        organization = %client.organization_url(),
        pools = ?pool_names,
        "Worker service is up"
    );

    scheduler::run_scheduler_loop(&trigger, &client, &pool_names, cancel).await;
    Ok(())
}

/// Run a single bump cycle right now.
pub async fn run_once(config: &WorkerConfig) -> Result<bump::CycleReport> {
    let client = HttpDevOpsClient::from_config(config)?;
    let report = bump::run_cycle(&client, &config.pool_names(), &CancellationToken::new()).await;
    Ok(report)
}

/// Compute bump plans for every configured pool without bumping anything.
pub async fn preview(config: &WorkerConfig) -> Result<Vec<(devops::Pool, Option<bump::BumpPlan>)>> {
    let client = HttpDevOpsClient::from_config(config)?;
    Ok(bump::plan_cycle(&client, &config.pool_names()).await)
}
