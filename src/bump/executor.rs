use super::planner::BumpPlan;
use crate::devops::{DevOpsClient, Pool};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

/// Accounting for one pool's bump calls. Not a transactional result: earlier
/// successful bumps stay in place when a later one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BumpOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub cancelled: bool,
}

impl BumpOutcome {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Issue one bump call per request id, strictly in plan order.
///
/// Failures are logged and skipped. Cancellation is checked before each call;
/// a call already in flight is allowed to finish.
pub async fn execute_plan(
    client: &dyn DevOpsClient,
    pool: &Pool,
    plan: &BumpPlan,
    cancel: &CancellationToken,
) -> BumpOutcome {
    let mut outcome = BumpOutcome::default();

    for &request_id in plan.request_ids() {
        if cancel.is_cancelled() {
            info!(
                pool_id = pool.id,
                pool_name = %pool.name,
                remaining = plan.len() - outcome.attempted,
                "Cancelled, abandoning remaining bumps"
            );
            outcome.cancelled = true;
            break;
        }

        trace!(pool_id = pool.id, request_id, "Bumping job request");
        outcome.attempted += 1;

        match client.bump_job_request(pool.id, request_id).await {
            Ok(()) => {
                outcome.succeeded += 1;
                trace!(
                    pool_id = pool.id,
                    pool_name = %pool.name,
                    request_id,
                    "Job request bumped"
                );
            }
            Err(e) => {
                error!(
                    pool_id = pool.id,
                    pool_name = %pool.name,
                    request_id,
                    error = %e,
                    "Bump request failed"
                );
            }
        }
    }

    info!(
        pool_id = pool.id,
        pool_name = %pool.name,
        bumped = outcome.succeeded,
        failed = outcome.failed(),
        "Total of {} jobs bumped successfully",
        outcome.succeeded
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bump::inspector::QueueSnapshot;
    use crate::bump::planner::plan_bumps;
    use crate::devops::fake::{waiting, FakeDevOps};
    use crate::devops::{DevOpsError, JobRequest};

    /// Records like `FakeDevOps`, then trips the token once the first bump lands.
    struct CancelAfterFirstBump {
        inner: FakeDevOps,
        cancel: CancellationToken,
    }

    #[async_trait::async_trait]
    impl DevOpsClient for CancelAfterFirstBump {
        async fn list_pools(&self) -> Result<Vec<Pool>, DevOpsError> {
            self.inner.list_pools().await
        }

        async fn list_job_requests(&self, pool_id: i64) -> Result<Vec<JobRequest>, DevOpsError> {
            self.inner.list_job_requests(pool_id).await
        }

        async fn bump_job_request(&self, pool_id: i64, request_id: i64) -> Result<(), DevOpsError> {
            let result = self.inner.bump_job_request(pool_id, request_id).await;
            self.cancel.cancel();
            result
        }
    }

    fn linux() -> Pool {
        Pool { id: 7, name: "Linux".to_string() }
    }

    fn plan_for(manual: &[i64]) -> BumpPlan {
        let mut requests = vec![waiting(1, None)];
        requests.extend(manual.iter().map(|id| waiting(*id, Some("False"))));
        plan_bumps(&QueueSnapshot::new(requests))
    }

    #[tokio::test]
    async fn test_bumps_in_plan_order() {
        let client = FakeDevOps::default();
        let plan = plan_for(&[10, 20, 30]);

        let outcome = execute_plan(&client, &linux(), &plan, &CancellationToken::new()).await;

        assert_eq!(client.bumps(), vec![(7, 30), (7, 20), (7, 10)]);
        assert_eq!(outcome, BumpOutcome { attempted: 3, succeeded: 3, cancelled: false });
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_bumps() {
        let client = FakeDevOps::default().fail_bump(20);
        let plan = plan_for(&[10, 20, 30]);

        let outcome = execute_plan(&client, &linux(), &plan, &CancellationToken::new()).await;

        assert_eq!(client.bumps(), vec![(7, 30), (7, 20), (7, 10)]);
        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_issues_no_calls() {
        let client = FakeDevOps::default();
        let plan = plan_for(&[10, 20]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = execute_plan(&client, &linux(), &plan, &cancel).await;

        assert!(client.bumps().is_empty());
        assert!(outcome.cancelled);
        assert_eq!(outcome.attempted, 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_plan_abandons_the_rest() {
        let cancel = CancellationToken::new();
        let client = CancelAfterFirstBump {
            inner: FakeDevOps::default(),
            cancel: cancel.clone(),
        };
        let plan = plan_for(&[10, 20, 30]);

        let outcome = execute_plan(&client, &linux(), &plan, &cancel).await;

        // the in-flight call completes, nothing after it is sent
        assert_eq!(client.inner.bumps(), vec![(7, 30)]);
        assert_eq!(outcome, BumpOutcome { attempted: 1, succeeded: 1, cancelled: true });
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let client = FakeDevOps::default();
        let outcome =
            execute_plan(&client, &linux(), &BumpPlan::default(), &CancellationToken::new()).await;
        assert_eq!(outcome, BumpOutcome::default());
        assert!(client.bumps().is_empty());
    }
}
