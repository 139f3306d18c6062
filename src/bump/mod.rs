//! One bump cycle: resolve pools, then inspect, plan and bump each pool in turn.
//!
//! Nothing in here returns an error. Every remote failure is logged where it
//! happens and shows up only as a skipped pool or a lower bump count in the
//! [`CycleReport`].

pub mod executor;
pub mod inspector;
pub mod planner;
pub mod resolver;

pub use self::executor::{execute_plan, BumpOutcome};
pub use self::inspector::{fetch_snapshot, QueueSnapshot};
pub use self::planner::{plan_bumps, BumpPlan};
pub use self::resolver::resolve_pools;

use crate::devops::{DevOpsClient, Pool};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// What happened to one pool during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PoolOutcome {
    /// The queue could not be fetched.
    Skipped,
    /// No scheduled request is waiting, or nothing else is waiting ahead of it.
    NothingToBump,
    Bumped(BumpOutcome),
    /// Cancellation arrived before this pool was inspected.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PoolReport {
    pub pool: Pool,
    #[serde(flatten)]
    pub outcome: PoolOutcome,
}

/// Result of one cycle. An empty `pools` list means resolution failed or no
/// configured pool exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CycleReport {
    pub pools: Vec<PoolReport>,
}

impl CycleReport {
    pub fn total_bumped(&self) -> usize {
        self.pools
            .iter()
            .map(|p| match &p.outcome {
                PoolOutcome::Bumped(o) => o.succeeded,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome_for(&self, pool_id: i64) -> Option<&PoolOutcome> {
        self.pools
            .iter()
            .find(|p| p.pool.id == pool_id)
            .map(|p| &p.outcome)
    }
}

/// Run one full cycle against `pool_names`.
pub async fn run_cycle(
    client: &dyn DevOpsClient,
    pool_names: &[String],
    cancel: &CancellationToken,
) -> CycleReport {
    info!("Starting to execute job");

    let pools = resolve_pools(client, pool_names).await;
    if pools.is_empty() {
        error!("Could not find any pool to execute bumping rules");
        return CycleReport::default();
    }

    let mut report = CycleReport::default();
    for pool in pools {
        if cancel.is_cancelled() {
            report.pools.push(PoolReport {
                pool,
                outcome: PoolOutcome::Cancelled,
            });
            continue;
        }
        let outcome = run_pool(client, &pool, cancel).await;
        report.pools.push(PoolReport { pool, outcome });
    }

    info!(bumped = report.total_bumped(), "Job is completed");
    report
}

async fn run_pool(client: &dyn DevOpsClient, pool: &Pool, cancel: &CancellationToken) -> PoolOutcome {
    let Some(snapshot) = fetch_snapshot(client, pool).await else {
        return PoolOutcome::Skipped;
    };

    let plan = plan_bumps(&snapshot);
    if plan.is_empty() {
        info!(
            pool_id = pool.id,
            pool_name = %pool.name,
            scheduled_waiting = plan.scheduled_waiting(),
            non_scheduled_waiting = plan.non_scheduled_waiting(),
            "Nothing to bump"
        );
        return PoolOutcome::NothingToBump;
    }

    info!(
        pool_id = pool.id,
        pool_name = %pool.name,
        scheduled_waiting = plan.scheduled_waiting(),
        to_bump = plan.len(),
        "Scheduled builds found in the queue"
    );
    PoolOutcome::Bumped(execute_plan(client, pool, &plan, cancel).await)
}

/// Resolve and inspect like [`run_cycle`] but only compute plans; no bump call
/// is made. `None` marks a pool whose queue could not be fetched.
pub async fn plan_cycle(
    client: &dyn DevOpsClient,
    pool_names: &[String],
) -> Vec<(Pool, Option<BumpPlan>)> {
    let mut plans = Vec::new();
    for pool in resolve_pools(client, pool_names).await {
        let plan = fetch_snapshot(client, &pool)
            .await
            .map(|snapshot| plan_bumps(&snapshot));
        plans.push((pool, plan));
    }
    plans
}
