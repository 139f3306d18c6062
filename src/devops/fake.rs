//! In-memory `DevOpsClient` for unit tests.

use super::model::{JobRequest, JobRequestData, Pool};
use super::{DevOpsClient, DevOpsError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn status_error(status: u16) -> DevOpsError {
    DevOpsError::Status {
        url: "fake://".to_string(),
        status,
        body: String::new(),
    }
}

pub(crate) fn waiting(request_id: i64, flag: Option<&str>) -> JobRequest {
    JobRequest {
        request_id,
        result: None,
        reserved_agent: None,
        data: Some(JobRequestData {
            is_scheduled_key: flag.map(str::to_string),
        }),
        queue_time: None,
        priority: Some(0),
    }
}

pub(crate) fn running(request_id: i64, flag: Option<&str>) -> JobRequest {
    JobRequest {
        reserved_agent: Some(serde_json::json!({ "id": 1, "name": "agent-1" })),
        ..waiting(request_id, flag)
    }
}

pub(crate) fn finished(request_id: i64, flag: Option<&str>) -> JobRequest {
    JobRequest {
        result: Some("succeeded".to_string()),
        ..waiting(request_id, flag)
    }
}

#[derive(Default)]
pub(crate) struct FakeDevOps {
    pub pools: Option<Vec<Pool>>,
    pub queues: HashMap<i64, Vec<JobRequest>>,
    pub failing_bumps: HashSet<i64>,
    pub bumps: Mutex<Vec<(i64, i64)>>,
    pub queue_fetches: Mutex<Vec<i64>>,
}

impl FakeDevOps {
    pub fn with_pools(pools: &[(i64, &str)]) -> Self {
        Self {
            pools: Some(
                pools
                    .iter()
                    .map(|(id, name)| Pool {
                        id: *id,
                        name: name.to_string(),
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn queue(mut self, pool_id: i64, requests: Vec<JobRequest>) -> Self {
        self.queues.insert(pool_id, requests);
        self
    }

    pub fn fail_bump(mut self, request_id: i64) -> Self {
        self.failing_bumps.insert(request_id);
        self
    }

    pub fn bumps(&self) -> Vec<(i64, i64)> {
        self.bumps.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DevOpsClient for FakeDevOps {
    async fn list_pools(&self) -> Result<Vec<Pool>, DevOpsError> {
        self.pools.clone().ok_or_else(|| status_error(500))
    }

    async fn list_job_requests(&self, pool_id: i64) -> Result<Vec<JobRequest>, DevOpsError> {
        self.queue_fetches.lock().unwrap().push(pool_id);
        self.queues
            .get(&pool_id)
            .cloned()
            .ok_or_else(|| status_error(404))
    }

    async fn bump_job_request(&self, pool_id: i64, request_id: i64) -> Result<(), DevOpsError> {
        self.bumps.lock().unwrap().push((pool_id, request_id));
        if self.failing_bumps.contains(&request_id) {
            return Err(status_error(409));
        }
        Ok(())
    }
}
