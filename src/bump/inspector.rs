use crate::devops::{DevOpsClient, JobRequest, Pool};
use tracing::{debug, error};

/// The job requests of one pool at one instant, in the service's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    requests: Vec<JobRequest>,
}

impl QueueSnapshot {
    pub fn new(requests: Vec<JobRequest>) -> Self {
        Self { requests }
    }

    pub fn requests(&self) -> &[JobRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.requests.iter().filter(|r| r.is_pending()).count()
    }
}

/// Fetch the current queue of `pool`. `None` means the pool is skipped this cycle.
pub async fn fetch_snapshot(client: &dyn DevOpsClient, pool: &Pool) -> Option<QueueSnapshot> {
    match client.list_job_requests(pool.id).await {
        Ok(requests) => {
            let snapshot = QueueSnapshot::new(requests);
            debug!(
                pool_id = pool.id,
                pool_name = %pool.name,
                total = snapshot.len(),
                pending = snapshot.pending(),
                "Fetched job requests"
            );
            Some(snapshot)
        }
        Err(e) => {
            error!(
                pool_id = pool.id,
                pool_name = %pool.name,
                error = %e,
                "Could not retrieve job requests"
            );
            None
        }
    }
}
