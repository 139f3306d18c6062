//! Azure DevOps `distributedtask` API: wire model, client trait and the
//! reqwest-backed implementation.

pub mod http;
pub mod model;

#[cfg(test)]
pub(crate) mod fake;

pub use self::http::HttpDevOpsClient;
pub use self::model::{JobRequest, Pool, WaitClass};

use thiserror::Error;

/// Lock token that overrides whatever lock currently holds a job request.
pub const OVERRIDE_LOCK_TOKEN: &str = "00000000-0000-0000-0000-000000000000";

/// `updateOptions` value asking the service to move a request to the head of its queue.
pub const UPDATE_OPTIONS_BUMP: u32 = 1;

pub const BUMP_API_VERSION: &str = "6.1-preview.1";

#[derive(Debug, Error)]
pub enum DevOpsError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The three remote operations the worker needs.
#[async_trait::async_trait]
pub trait DevOpsClient: Send + Sync {
    /// All agent pools visible to the credential.
    async fn list_pools(&self) -> Result<Vec<Pool>, DevOpsError>;

    /// Every job request of a pool, in the service's native order.
    async fn list_job_requests(&self, pool_id: i64) -> Result<Vec<JobRequest>, DevOpsError>;

    /// Move one job request to the head of its pool's queue.
    async fn bump_job_request(&self, pool_id: i64, request_id: i64) -> Result<(), DevOpsError>;
}

pub fn pools_path() -> String {
    "_apis/distributedtask/pools/".to_string()
}

pub fn job_requests_path(pool_id: i64) -> String {
    format!("_apis/distributedtask/pools/{pool_id}/jobrequests?includeStatus=true")
}

pub fn bump_path(pool_id: i64, request_id: i64) -> String {
    format!(
        "_apis/distributedtask/pools/{pool_id}/jobrequests/{request_id}?lockToken={OVERRIDE_LOCK_TOKEN}&updateOptions={UPDATE_OPTIONS_BUMP}&api-version={BUMP_API_VERSION}"
    )
}
