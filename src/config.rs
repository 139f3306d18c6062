//! TOML configuration for the queuebump worker.
//!
//! The file is read once at startup into an immutable [`WorkerConfig`] that is
//! passed by reference to everything else. The personal access token may be
//! supplied through `QUEUEBUMP_PAT` instead of the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scheduler::CronTrigger;

/// Environment variable that overrides `organization.pat`.
pub const PAT_ENV: &str = "QUEUEBUMP_PAT";

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing arguments: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("invalid organization base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("http timeout must be greater than zero")]
    ZeroTimeout,
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub pools: PoolsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WorkerConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `QUEUEBUMP_PAT` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_pat_override(std::env::var(PAT_ENV).ok())
    }

    pub fn with_pat_override(mut self, pat: Option<String>) -> Self {
        if let Some(pat) = pat.filter(|p| !p.trim().is_empty()) {
            self.organization.pat = pat;
        }
        self
    }

    /// Reject configurations no cycle could run with. All missing settings are
    /// reported together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.organization.name.trim().is_empty() {
            missing.push("Azure DevOps organization name");
        }
        if self.organization.pat.trim().is_empty() {
            missing.push("Azure DevOps pat value");
        }
        if self.schedule.cron_expression.trim().is_empty() {
            missing.push("cron expression");
        }
        if self.pool_names().is_empty() {
            missing.push("pool names");
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        CronTrigger::from_config(&self.schedule)?;

        reqwest::Url::parse(&self.organization_url()).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.organization.base_url.clone(),
            reason: e.to_string(),
        })?;

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Organization root all API paths are relative to, with a trailing slash.
    pub fn organization_url(&self) -> String {
        format!(
            "{}/{}/",
            self.organization.base_url.trim_end_matches('/'),
            self.organization.name.trim()
        )
    }

    /// Configured pool names, trimmed, blanks dropped, duplicates removed.
    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in &self.pools.names {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// Organization name, the first path segment after the base URL.
    pub name: String,
    pub base_url: String,
    /// Personal access token. Never serialized or printed.
    #[serde(skip_serializing)]
    pub pat: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            pat: String::new(),
        }
    }
}

impl std::fmt::Debug for OrganizationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("pat", &if self.pat.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Standard 5-field crontab, or 6/7 fields with seconds (and year).
    pub cron_expression: String,
    pub time_zone: TimeZoneSetting,
}

/// Zone the cron expression is evaluated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
    #[default]
    Local,
    Utc,
}

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolsConfig {
    /// Agent pool names, matched exactly and case-sensitively.
    pub names: Vec<String>,
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
