use super::model::{JobRequest, ListResponse, Pool};
use super::{bump_path, job_requests_path, pools_path, DevOpsClient, DevOpsError};
use crate::config::WorkerConfig;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Azure DevOps client over a single pooled `reqwest::Client`.
///
/// Requests authenticate with HTTP Basic, empty user name and the personal
/// access token as password.
#[derive(Clone)]
pub struct HttpDevOpsClient {
    client: Client,
    organization_url: String,
    pat: String,
}

impl std::fmt::Debug for HttpDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDevOpsClient")
            .field("organization_url", &self.organization_url)
            .finish_non_exhaustive()
    }
}

impl HttpDevOpsClient {
    /// `organization_url` is the organization root, e.g. `https://dev.azure.com/contoso/`.
    pub fn new(organization_url: &str, pat: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let mut organization_url = organization_url.to_string();
        if !organization_url.ends_with('/') {
            organization_url.push('/');
        }

        Ok(Self {
            client,
            organization_url,
            pat: pat.to_string(),
        })
    }

    pub fn from_config(config: &WorkerConfig) -> Result<Self> {
        Self::new(
            &config.organization_url(),
            &config.organization.pat,
            Duration::from_secs(config.http.timeout_secs),
        )
    }

    pub fn organization_url(&self) -> &str {
        &self.organization_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.organization_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DevOpsError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .basic_auth("", Some(&self.pat))
            .send()
            .await
            .map_err(|source| DevOpsError::Transport {
                url: url.clone(),
                source,
            })?;

        let response = check_status(&url, response).await?;
        let body = response
            .text()
            .await
            .map_err(|source| DevOpsError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| DevOpsError::Decode { url, source })
    }
}

/// Turn a non-2xx response into `DevOpsError::Status`, keeping the body for the log.
async fn check_status(url: &str, response: Response) -> Result<Response, DevOpsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DevOpsError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait::async_trait]
impl DevOpsClient for HttpDevOpsClient {
    async fn list_pools(&self) -> Result<Vec<Pool>, DevOpsError> {
        let list: ListResponse<Pool> = self.get_json(&pools_path()).await?;
        Ok(list.value)
    }

    async fn list_job_requests(&self, pool_id: i64) -> Result<Vec<JobRequest>, DevOpsError> {
        let list: ListResponse<JobRequest> = self.get_json(&job_requests_path(pool_id)).await?;
        Ok(list.value)
    }

    async fn bump_job_request(&self, pool_id: i64, request_id: i64) -> Result<(), DevOpsError> {
        let url = self.url(&bump_path(pool_id, request_id));
        let response = self
            .client
            .patch(&url)
            .basic_auth("", Some(&self.pat))
            .json(&serde_json::json!({ "requestId": request_id }))
            .send()
            .await
            .map_err(|source| DevOpsError::Transport {
                url: url.clone(),
                source,
            })?;

        check_status(&url, response).await?;
        Ok(())
    }
}
