//! Wire types for the `distributedtask` REST API.
//!
//! Every field the worker does not need is ignored on decode, and every field
//! the service may omit or send as `null` is an `Option`. Absence carries
//! meaning here: a job request with no `result` and no `reservedAgent` is still
//! waiting in the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The literal the service uses in `data.IsScheduledKey` for manual and CI runs.
pub const NOT_SCHEDULED_FLAG: &str = "False";

/// `{ count, value }` envelope returned by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: usize,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A named collection of build agents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pool {
    pub id: i64,
    pub name: String,
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

/// Free-form `data` bag attached to a job request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequestData {
    #[serde(rename = "IsScheduledKey", default)]
    pub is_scheduled_key: Option<String>,
}

/// How a waiting job request got into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitClass {
    /// Queued by a manual or CI trigger (`IsScheduledKey == "False"`).
    NonScheduled,
    /// Queued by a time-based trigger, or of unknown origin.
    Scheduled,
}

/// One entry of a pool's job request queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub request_id: i64,
    #[serde(default)]
    pub result: Option<String>,
    /// The claiming agent. Only its presence matters, so the shape is not checked.
    #[serde(default)]
    pub reserved_agent: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<JobRequestData>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub queue_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl JobRequest {
    /// Not finished and not yet claimed by an agent.
    pub fn is_pending(&self) -> bool {
        self.result.is_none() && self.reserved_agent.is_none()
    }

    pub fn scheduled_flag(&self) -> Option<&str> {
        self.data.as_ref()?.is_scheduled_key.as_deref()
    }

    /// Classification of a waiting request; `None` for running or finished ones.
    pub fn wait_class(&self) -> Option<WaitClass> {
        if !self.is_pending() {
            return None;
        }
        match self.scheduled_flag() {
            Some(NOT_SCHEDULED_FLAG) => Some(WaitClass::NonScheduled),
            _ => Some(WaitClass::Scheduled),
        }
    }
}

/// An unparseable `queueTime` is treated as absent rather than failing the
/// whole queue listing.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
